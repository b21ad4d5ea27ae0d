//! OneBot v11 HTTP transport

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ChatTransport, DomainError};
use crate::infrastructure::http_client::HttpClientTrait;

/// Sends group messages through a OneBot v11 HTTP endpoint
#[derive(Debug)]
pub struct OneBotTransport<C: HttpClientTrait> {
    client: C,
    base_url: String,
    auth_header: Option<String>,
}

impl<C: HttpClientTrait> OneBotTransport<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: None,
        }
    }

    /// Authenticate with the access token configured on the OneBot side
    pub fn with_access_token(mut self, token: impl AsRef<str>) -> Self {
        let token = token.as_ref().trim();
        self.auth_header = (!token.is_empty()).then(|| format!("Bearer {}", token));
        self
    }

    async fn send_group_msg(&self, group_id: &str, segment: Segment<'_>) -> Result<(), DomainError> {
        let body = serde_json::json!({
            "group_id": group_id_value(group_id),
            "message": [segment],
        });

        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(auth) = &self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }

        let url = format!("{}/send_group_msg", self.base_url);
        let reply: ActionResponse = serde_json::from_value(self.client.post_json(&url, headers, &body).await?)
            .map_err(|e| DomainError::transport(format!("Unexpected OneBot reply: {}", e)))?;

        if reply.status == "failed" || reply.retcode != 0 {
            return Err(DomainError::transport(format!(
                "send_group_msg failed with retcode {}: {}",
                reply.retcode,
                reply.wording.or(reply.message).unwrap_or_default()
            )));
        }

        debug!(group_id, "Group message sent");
        Ok(())
    }
}

/// Numeric group ids are sent as numbers, as OneBot implementations expect
fn group_id_value(group_id: &str) -> serde_json::Value {
    match group_id.parse::<i64>() {
        Ok(id) => serde_json::json!(id),
        Err(_) => serde_json::json!(group_id),
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatTransport for OneBotTransport<C> {
    async fn send_text(&self, conversation: &str, text: &str) -> Result<(), DomainError> {
        self.send_group_msg(conversation, Segment::Text { text }).await
    }

    async fn send_image(&self, conversation: &str, file: &str) -> Result<(), DomainError> {
        self.send_group_msg(conversation, Segment::Image { file }).await
    }
}

/// One element of a OneBot message array
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum Segment<'a> {
    Text { text: &'a str },
    Image { file: &'a str },
}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    retcode: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    wording: Option<String>,
}
