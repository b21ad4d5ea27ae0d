use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::state::AppState;
use super::v1;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/v1", v1::create_v1_router())
        .nest("/admin", admin::create_admin_router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::web::MockWebAcquisition;
    use crate::domain::{CompletionClient, IndexName, RetrievalGateway, Tokenizer};
    use crate::infrastructure::ingestion::{HashDeduplicator, KnowledgeIngestor};
    use crate::infrastructure::knowledge_base::InMemoryRetrievalGateway;
    use crate::infrastructure::workflow::WorkflowOrchestrator;

    fn index() -> IndexName {
        IndexName::new("knowledge_library").unwrap()
    }

    fn app_state(llm: MockLlmProvider, web: MockWebAcquisition) -> AppState {
        let tokenizer = Tokenizer::default();
        let gateway: Arc<dyn RetrievalGateway> =
            Arc::new(InMemoryRetrievalGateway::with_tokenizer(tokenizer.clone()));
        let ingestor =
            KnowledgeIngestor::new(Arc::new(HashDeduplicator::new(gateway.clone(), index())));
        let web = Arc::new(web);
        let orchestrator = WorkflowOrchestrator::new(
            CompletionClient::new(Arc::new(llm), "qwen-turbo"),
            gateway.clone(),
            web.clone(),
            ingestor.clone(),
            index(),
        )
        .with_tokenizer(tokenizer);

        AppState::new(Arc::new(orchestrator), gateway, Arc::new(ingestor), web)
    }

    fn app() -> Router {
        create_router_with_state(app_state(MockLlmProvider::new(), MockWebAcquisition::new()))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_live_check() {
        let (status, _) = send(&app(), empty_request(Method::GET, "/live")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_is_degraded_before_first_ingestion() {
        let (status, body) = send(&app(), empty_request(Method::GET, "/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"][0]["name"], "memory:knowledge_library");
    }

    #[tokio::test]
    async fn test_ask_persona_answer() {
        let llm = MockLlmProvider::new()
            .with_reply(r#"{"judgment": false, "keywords": []}"#)
            .with_reply(r#"{"answer": "Good morning, nya~"}"#);
        let app = create_router_with_state(app_state(llm, MockWebAcquisition::new()));

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/v1/ask", json!({"question": "Good morning!"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Good morning, nya~");
        assert_eq!(body["source"], "persona");
    }

    #[tokio::test]
    async fn test_ask_blank_question_is_bad_request() {
        let (status, body) = send(
            &app(),
            json_request(Method::POST, "/v1/ask", json!({"question": "  "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_ask_contract_violation_is_bad_gateway() {
        let llm = MockLlmProvider::new().with_reply("Sure! Saber is a knight.");
        let app = create_router_with_state(app_state(llm, MockWebAcquisition::new()));

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/v1/ask", json!({"question": "Who is Saber?"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "contract_violation");
    }

    #[tokio::test]
    async fn test_shallow_ask_answers_from_sample() {
        let llm = MockLlmProvider::new()
            .with_reply(r#"{"can_answer": true, "message": "Excalibur."}"#);
        let app = create_router_with_state(app_state(llm, MockWebAcquisition::new()));

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/v1/ask/shallow",
                json!({"question": "What is Saber's sword?", "level": 1}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Excalibur.");
    }

    #[tokio::test]
    async fn test_events_without_chat_surface() {
        let event = json!({"type": "poke", "from_user": "1", "target_user": "2", "group_id": "3"});
        let (status, _) = send(&app(), json_request(Method::POST, "/v1/events", event)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_index_and_entry_lifecycle() {
        let app = app();

        let (status, body) = send(&app, empty_request(Method::PUT, "/admin/indexes/lore")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["created"], true);

        let (status, _) = send(&app, empty_request(Method::PUT, "/admin/indexes/lore")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/admin/indexes/lore/entries",
                json!({"id": "saber", "content": "Saber wields Excalibur."}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "saber");

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/admin/indexes/lore/search",
                json!({"query": "Excalibur"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "full_text");
        assert_eq!(body["total"], 1);
        assert_eq!(body["hits"][0]["id"], "saber");

        let (status, body) =
            send(&app, empty_request(Method::GET, "/admin/indexes/lore/entries/saber")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "Saber wields Excalibur.");

        let (status, _) =
            send(&app, empty_request(Method::DELETE, "/admin/indexes/lore/entries/saber")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) =
            send(&app, empty_request(Method::GET, "/admin/indexes/lore/entries/saber")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");

        let (status, _) = send(&app, empty_request(Method::DELETE, "/admin/indexes/lore")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, empty_request(Method::DELETE, "/admin/indexes/lore")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_index_name_is_bad_request() {
        let (status, _) = send(&app(), empty_request(Method::PUT, "/admin/indexes/Bad%20Name")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_vector_search_requires_embedder() {
        let (status, body) = send(
            &app(),
            json_request(
                Method::POST,
                "/admin/indexes/lore/search",
                json!({"query": "Excalibur", "mode": "vector"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("embedding"));
    }

    #[tokio::test]
    async fn test_hybrid_search_with_embedder() {
        let state = app_state(MockLlmProvider::new(), MockWebAcquisition::new())
            .with_embedder(Arc::new(MockEmbeddingProvider::new(8)));
        let app = create_router_with_state(state);

        let (status, _) = send(&app, empty_request(Method::PUT, "/admin/indexes/lore")).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/admin/indexes/lore/entries",
                json!({"content": "Saber wields Excalibur."}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["vector_embedding"].as_array().unwrap().len(), 8);

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/admin/indexes/lore/search",
                json!({"query": "Excalibur", "mode": "hybrid"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_ingest_text_then_list_entries() {
        let app = app();
        let content = "Saber wields Excalibur.\n\nShe is the King of Knights.";

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/admin/ingest",
                json!({"content": content, "source": "fate"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["segments"], 2);
        assert_eq!(body["added"], 2);

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/admin/ingest", json!({"content": content})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skipped"], 2);

        let (status, body) = send(
            &app,
            empty_request(Method::GET, "/admin/indexes/knowledge_library/entries?limit=10"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn test_web_probe() {
        let web = MockWebAcquisition::new().with_search_text("Saber - Fate/stay night");
        let app = create_router_with_state(app_state(MockLlmProvider::new(), web));

        let (status, body) =
            send(&app, empty_request(Method::GET, "/admin/web/search?query=Saber")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Saber - Fate/stay night");
        assert_eq!(body["query"], "Saber");
    }
}
