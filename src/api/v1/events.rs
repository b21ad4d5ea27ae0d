//! Inbound chat events pushed by the chat platform

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::InboundEvent;
use crate::infrastructure::chat::EventDisposition;

/// POST /v1/events
pub async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Result<Json<EventDisposition>, ApiError> {
    let handler = state
        .chat
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("Chat surface is not configured"))?;

    debug!(kind = event.kind(), conversation = %event.conversation(), "Inbound event");
    Ok(Json(handler.handle(event).await))
}
