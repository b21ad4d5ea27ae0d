//! Answering flows

mod orchestrator;
mod shallow;

pub use orchestrator::WorkflowOrchestrator;
