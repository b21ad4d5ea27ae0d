//! Question answering endpoints

use axum::extract::State;
use serde::Deserialize;
use tracing::{debug, error};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{AnswerLevel, DomainError, Question, WorkflowOutcome};

/// Body of `POST /v1/ask` and `POST /v1/ask/shallow`
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// 0 = stored knowledge only, 1 = standard, 2 = always acquire
    #[serde(default)]
    pub level: AnswerLevel,
}

impl AskRequest {
    fn into_question(self) -> Result<Question, DomainError> {
        Ok(Question::new(self.question)?.with_level(self.level))
    }
}

/// POST /v1/ask
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<WorkflowOutcome>, ApiError> {
    let question = request.into_question()?;
    debug!(level = question.level().as_u8(), "Deep answer requested");

    let outcome = state.orchestrator.answer(&question).await.map_err(|e| {
        error!(error = %e, "Answer workflow failed");
        ApiError::from(e)
    })?;

    Ok(Json(outcome))
}

/// POST /v1/ask/shallow
pub async fn ask_shallow(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<WorkflowOutcome>, ApiError> {
    let question = request.into_question()?;
    debug!(level = question.level().as_u8(), "Shallow answer requested");

    let outcome = state.orchestrator.start(&question).await.map_err(|e| {
        error!(error = %e, "Shallow workflow failed");
        ApiError::from(e)
    })?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_request_defaults_to_standard_level() {
        let request: AskRequest = serde_json::from_str(r#"{"question": "Who is Saber?"}"#).unwrap();

        assert_eq!(request.level, AnswerLevel::Standard);
        assert_eq!(request.into_question().unwrap().text(), "Who is Saber?");
    }

    #[test]
    fn test_ask_request_with_level() {
        let request: AskRequest =
            serde_json::from_str(r#"{"question": "Who is Saber?", "level": 2}"#).unwrap();
        assert_eq!(request.level, AnswerLevel::Eager);
    }

    #[test]
    fn test_ask_request_rejects_unknown_level() {
        let result = serde_json::from_str::<AskRequest>(r#"{"question": "q", "level": 7}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_question_is_validation_error() {
        let request = AskRequest {
            question: "   ".to_string(),
            level: AnswerLevel::Standard,
        };

        assert!(matches!(
            request.into_question(),
            Err(DomainError::Validation { .. })
        ));
    }
}
