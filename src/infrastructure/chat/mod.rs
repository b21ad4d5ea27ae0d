//! Chat surface: OneBot transport and event handler

pub mod handler;
pub mod onebot;

pub use handler::{ChatHandler, EventDisposition};
pub use onebot::OneBotTransport;
