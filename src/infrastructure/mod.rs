//! Infrastructure layer - adapters for external services and the services built on them

pub mod chat;
pub mod embedding;
pub mod http_client;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;
pub mod logging;
pub mod web;
pub mod workflow;
