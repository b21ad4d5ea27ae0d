//! Inbound chat event dispatch

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{ChatConfig, ChatFlow};
use crate::domain::{ChatTransport, ConversationLocks, DomainError, InboundEvent, Question};
use crate::infrastructure::workflow::WorkflowOrchestrator;

/// Replies to a mention with no question in it
const EMPTY_MENTION_REPLIES: &[&str] = &["？？？", "干什么！", "?"];

/// What the handler did with an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventDisposition {
    Ignored,
    Replied { reply: String },
    /// The question failed; the generic error reply was sent
    Failed { reply: String },
}

/// Routes inbound events to the answering flows and replies through the transport
pub struct ChatHandler {
    transport: Arc<dyn ChatTransport>,
    orchestrator: Arc<WorkflowOrchestrator>,
    locks: ConversationLocks,
    config: ChatConfig,
}

impl ChatHandler {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        orchestrator: Arc<WorkflowOrchestrator>,
        config: ChatConfig,
    ) -> Self {
        Self {
            transport,
            orchestrator,
            locks: ConversationLocks::new(),
            config,
        }
    }

    /// Handle one event; never fails, failures are reported in the chat
    pub async fn handle(&self, event: InboundEvent) -> EventDisposition {
        debug!(kind = event.kind(), summary = %event.summary(), "Inbound event");

        match &event {
            InboundEvent::Message {
                content,
                group_id,
                target_id,
                ..
            } => {
                if !self.is_bot(target_id.as_deref()) {
                    return EventDisposition::Ignored;
                }
                self.on_mention(group_id, content).await
            }
            InboundEvent::Poke {
                target_user,
                group_id,
                ..
            } => {
                if !self.is_bot(Some(target_user.as_str())) {
                    return EventDisposition::Ignored;
                }
                match pick(&self.config.poke_replies) {
                    Some(reply) => self.reply(group_id, reply).await,
                    None => EventDisposition::Ignored,
                }
            }
        }
    }

    fn is_bot(&self, user: Option<&str>) -> bool {
        !self.config.bot_id.is_empty() && user == Some(self.config.bot_id.as_str())
    }

    async fn on_mention(&self, conversation: &str, content: &str) -> EventDisposition {
        let question = match Question::new(content) {
            Ok(question) => question,
            Err(_) => {
                let reply = pick(EMPTY_MENTION_REPLIES).unwrap_or_default();
                return self.reply(conversation, reply).await;
            }
        };

        let _guard = if self.config.serialize_conversations {
            Some(self.locks.acquire(conversation).await)
        } else {
            None
        };

        info!(conversation, flow = ?self.config.flow, "Answering mention");
        let result = match self.config.flow {
            ChatFlow::Deep => self.orchestrator.answer(&question).await,
            ChatFlow::Shallow => self.orchestrator.start(&question).await,
        };

        match result {
            Ok(outcome) => self.reply(conversation, outcome.answer).await,
            Err(e) => {
                log_failure(&e);
                self.send(conversation, &self.config.error_reply).await;
                EventDisposition::Failed {
                    reply: self.config.error_reply.clone(),
                }
            }
        }
    }

    async fn reply(&self, conversation: &str, reply: String) -> EventDisposition {
        self.send(conversation, &reply).await;
        EventDisposition::Replied { reply }
    }

    /// Fire-and-forget send; transport failures are logged only
    async fn send(&self, conversation: &str, text: &str) {
        if let Err(e) = self.transport.send_text(conversation, text).await {
            warn!(conversation, error = %e, "Failed to send chat reply");
        }
    }
}

impl std::fmt::Debug for ChatHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatHandler")
            .field("bot_id", &self.config.bot_id)
            .field("flow", &self.config.flow)
            .finish_non_exhaustive()
    }
}

fn pick<S: AsRef<str>>(replies: &[S]) -> Option<String> {
    replies
        .choose(&mut rand::thread_rng())
        .map(|s| s.as_ref().to_string())
}

fn log_failure(error: &DomainError) {
    match error {
        DomainError::ContractViolation { message, raw } => {
            error!(%message, raw = %raw, "LLM reply violated the response contract")
        }
        other => error!(error = %other, "Answering failed"),
    }
}
