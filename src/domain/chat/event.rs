//! Inbound chat events

use serde::{Deserialize, Serialize};

/// An event delivered by the chat platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A group message, possibly mentioning someone and quoting an earlier message
    Message {
        from_user: String,
        #[serde(default)]
        content: String,
        group_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_content: Option<String>,
        /// The user mentioned with `@`, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<String>,
    },
    /// A "poke" nudge from one user to another
    Poke {
        from_user: String,
        target_user: String,
        group_id: String,
    },
}

impl InboundEvent {
    pub fn message(
        from_user: impl Into<String>,
        group_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::Message {
            from_user: from_user.into(),
            content: content.into(),
            group_id: group_id.into(),
            image_url: None,
            reply_content: None,
            target_id: None,
        }
    }

    pub fn poke(
        from_user: impl Into<String>,
        target_user: impl Into<String>,
        group_id: impl Into<String>,
    ) -> Self {
        Self::Poke {
            from_user: from_user.into(),
            target_user: target_user.into(),
            group_id: group_id.into(),
        }
    }

    /// Set the mentioned user of a message event
    pub fn mentioning(mut self, user: impl Into<String>) -> Self {
        if let Self::Message { target_id, .. } = &mut self {
            *target_id = Some(user.into());
        }
        self
    }

    /// The conversation the event belongs to
    pub fn conversation(&self) -> &str {
        match self {
            Self::Message { group_id, .. } | Self::Poke { group_id, .. } => group_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::Poke { .. } => "poke",
        }
    }

    /// One-line summary of a message event for logs
    pub fn summary(&self) -> String {
        match self {
            Self::Message {
                from_user,
                content,
                image_url,
                reply_content,
                target_id,
                ..
            } => {
                let mut parts = vec![format!("from: {from_user}")];
                if let Some(target) = target_id {
                    parts.push(format!("@{target}"));
                }
                if !content.is_empty() {
                    parts.push(format!("content: {content}"));
                }
                if let Some(url) = image_url {
                    parts.push(format!("image: {url}"));
                }
                if let Some(reply) = reply_content {
                    parts.push(format!("replying to: {reply}"));
                }
                parts.join("; ")
            }
            Self::Poke {
                from_user,
                target_user,
                ..
            } => format!("{from_user} poked {target_user}"),
        }
    }
}
