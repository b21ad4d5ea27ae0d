//! Chat surface domain: inbound events, outbound transport and conversation locks

mod event;
mod locks;
mod transport;

pub use event::InboundEvent;
pub use locks::ConversationLocks;
pub use transport::ChatTransport;

#[cfg(test)]
pub use transport::MockChatTransport;
