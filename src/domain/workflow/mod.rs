//! Answering workflow domain: questions, states, configuration and prompts

mod config;
pub mod prompts;
mod question;
mod state;

pub use config::{WorkflowConfig, DEFAULT_KNOWLEDGE_INDEX};
pub use question::{AnswerLevel, Question};
pub use state::{
    AnswerSource, ShallowStep, StepRecord, WorkflowOutcome, WorkflowState, WorkflowTrace,
};
