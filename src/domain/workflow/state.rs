//! Workflow states, step trace and outcome

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// States of the deep answering flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Start,
    ExtractKeywords,
    /// The question needs no lookup; answered in persona
    NotApplicable,
    Search,
    CollectCandidateText,
    ExtractCorroboratingKeywords,
    GateRelevance,
    UseExistingKnowledge,
    AcquireAndIngest,
    SelectPassages,
    ComposeAnswer,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ExtractKeywords => "extract_keywords",
            Self::NotApplicable => "not_applicable",
            Self::Search => "search",
            Self::CollectCandidateText => "collect_candidate_text",
            Self::ExtractCorroboratingKeywords => "extract_corroborating_keywords",
            Self::GateRelevance => "gate_relevance",
            Self::UseExistingKnowledge => "use_existing_knowledge",
            Self::AcquireAndIngest => "acquire_and_ingest",
            Self::SelectPassages => "select_passages",
            Self::ComposeAnswer => "compose_answer",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NotApplicable | Self::ComposeAnswer)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Steps of the shallow flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShallowStep {
    SampleKnowledge,
    BoostedKnowledge,
    AcquireAndAnswer,
}

impl fmt::Display for ShallowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SampleKnowledge => "sample_knowledge",
            Self::BoostedKnowledge => "boosted_knowledge",
            Self::AcquireAndAnswer => "acquire_and_answer",
        })
    }
}

/// Where the final answer's material came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Persona reply without retrieval
    Persona,
    ExistingKnowledge,
    /// Freshly acquired web material
    Acquired,
    /// The LLM asked follow-up questions instead of answering
    FollowUp,
}

/// One executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: String,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Ordered record of the steps a run went through
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowTrace {
    pub steps: Vec<StepRecord>,
}

impl WorkflowTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: impl fmt::Display, started: Instant, detail: Option<String>) {
        self.steps.push(StepRecord {
            step: step.to_string(),
            execution_time_ms: started.elapsed().as_millis() as u64,
            detail,
        });
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step.as_str()).collect()
    }

    pub fn contains(&self, step: impl fmt::Display) -> bool {
        let name = step.to_string();
        self.steps.iter().any(|s| s.step == name)
    }
}

/// Result of one answering run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub answer: String,
    pub source: AnswerSource,
    /// Keywords the run searched with, if it got that far
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Fuzzy Jaccard score of the relevance gate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    pub trace: WorkflowTrace,
    pub execution_time_ms: u64,
}

impl WorkflowOutcome {
    pub fn new(answer: impl Into<String>, source: AnswerSource, trace: WorkflowTrace) -> Self {
        Self {
            answer: answer.into(),
            source,
            keywords: Vec::new(),
            similarity: None,
            trace,
            execution_time_ms: 0,
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_similarity(mut self, similarity: f32) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn finished(mut self, started: Instant) -> Self {
        self.execution_time_ms = started.elapsed().as_millis() as u64;
        self
    }
}
