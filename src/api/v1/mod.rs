//! Public v1 API: answering and chat events

pub mod ask;
pub mod events;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/ask", post(ask::ask))
        .route("/ask/shallow", post(ask::ask_shallow))
        .route("/events", post(events::receive_event))
}
