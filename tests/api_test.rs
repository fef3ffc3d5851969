use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use chat_relay::application::ports::TextGenerator;
use chat_relay::application::services::{RelayMode, RelayService, RoleMapping};
use chat_relay::domain::{Message, MessageRole};
use chat_relay::infrastructure::llm::MockTextGenerator;
use chat_relay::presentation::{AppState, create_router};

fn create_app(generator: Arc<MockTextGenerator>, mode: RelayMode) -> axum::Router {
    create_app_with_roles(generator, mode, RoleMapping::default())
}

fn create_app_with_roles(
    generator: Arc<MockTextGenerator>,
    mode: RelayMode,
    roles: RoleMapping,
) -> axum::Router {
    let generator: Arc<dyn TextGenerator> = generator;
    let state = AppState::new(RelayService::new(generator, mode), roles);
    create_router(state)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn given_running_server_when_health_check_then_returns_ok() {
    let app = create_app(Arc::new(MockTextGenerator::reply("ok")), RelayMode::Batch);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn given_batch_upstream_success_when_posting_prompt_then_returns_content_json() {
    let app = create_app(Arc::new(MockTextGenerator::reply("Paris")), RelayMode::Batch);

    let response = app
        .oneshot(chat_request(r#""What is the capital of France?""#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(body_text(response).await, r#"{"content":"Paris"}"#);
}

#[tokio::test]
async fn given_batch_upstream_failure_when_posting_prompt_then_returns_internal_error() {
    let app = create_app(Arc::new(MockTextGenerator::failing()), RelayMode::Batch);

    let response = app.oneshot(chat_request(r#""Hello""#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn given_string_payload_when_relaying_then_generator_receives_single_user_turn() {
    let generator = Arc::new(MockTextGenerator::reply("Hi"));
    let app = create_app(Arc::clone(&generator), RelayMode::Batch);

    let response = app.oneshot(chat_request(r#""Hello there""#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        generator.last_messages().unwrap(),
        vec![Message::user("Hello there")]
    );
}

#[tokio::test]
async fn given_history_payload_when_relaying_then_generator_receives_turns_in_order() {
    let generator = Arc::new(MockTextGenerator::reply("Fine"));
    let app = create_app(Arc::clone(&generator), RelayMode::Batch);

    let response = app
        .oneshot(chat_request(
            r#"[
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"},
                {"role": "user", "content": "How are you?"}
            ]"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        generator.last_messages().unwrap(),
        vec![
            Message::user("Hi"),
            Message::assistant("Hello!"),
            Message::user("How are you?"),
        ]
    );
}

#[tokio::test]
async fn given_roles_field_and_system_alias_when_relaying_then_replies_map_to_assistant() {
    let generator = Arc::new(MockTextGenerator::reply("Sure"));
    let roles = RoleMapping {
        assistant_aliases: vec!["system".to_string()],
    };
    let app = create_app_with_roles(Arc::clone(&generator), RelayMode::Batch, roles);

    let response = app
        .oneshot(chat_request(
            r#"[
                {"roles": "user", "content": "Hi"},
                {"roles": "system", "content": "Hello!"},
                {"roles": "user", "content": "Again"}
            ]"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let roles: Vec<MessageRole> = generator
        .last_messages()
        .unwrap()
        .into_iter()
        .map(|m| m.role)
        .collect();
    assert_eq!(
        roles,
        vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
    );
}

#[tokio::test]
async fn given_blank_prompt_when_relaying_then_returns_bad_request() {
    let app = create_app(Arc::new(MockTextGenerator::reply("x")), RelayMode::Batch);

    let response = app.oneshot(chat_request(r#""   ""#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn assert_invalid_request(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert!(body["error"]["message"].as_str().is_some());
}

#[tokio::test]
async fn given_malformed_json_when_relaying_then_returns_bad_request_error_body() {
    let app = create_app(Arc::new(MockTextGenerator::reply("x")), RelayMode::Batch);

    let response = app.oneshot(chat_request("{not json")).await.unwrap();

    assert_invalid_request(response).await;
}

#[tokio::test]
async fn given_json_of_wrong_shape_when_relaying_then_returns_bad_request_error_body() {
    for body in [r#"{"foo":1}"#, "42"] {
        let app = create_app(Arc::new(MockTextGenerator::reply("x")), RelayMode::Batch);

        let response = app.oneshot(chat_request(body)).await.unwrap();

        assert_invalid_request(response).await;
    }
}

#[tokio::test]
async fn given_unknown_role_when_relaying_then_error_body_names_invalid_request() {
    let app = create_app(Arc::new(MockTextGenerator::reply("x")), RelayMode::Batch);

    let response = app
        .oneshot(chat_request(r#"[{"role": "narrator", "content": "Once"}]"#))
        .await
        .unwrap();

    assert_invalid_request(response).await;
}

#[tokio::test]
async fn given_prompt_without_json_content_type_when_relaying_then_still_relays() {
    for content_type in [None, Some("text/plain")] {
        let app = create_app(Arc::new(MockTextGenerator::reply("Paris")), RelayMode::Batch);
        let mut request = Request::builder().method("POST").uri("/api/chat");
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        let request = request
            .body(Body::from(r#""Capital of France?""#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"content":"Paris"}"#);
    }
}

#[tokio::test]
async fn given_stream_mode_when_upstream_emits_chunks_then_body_concatenates_them() {
    let app = create_app(
        Arc::new(MockTextGenerator::chunks(["Hel", "lo"])),
        RelayMode::Stream,
    );

    let response = app.oneshot(chat_request(r#""Say hello""#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_text(response).await, "Hello");
}

#[tokio::test]
async fn given_stream_mode_when_upstream_call_fails_then_returns_internal_error() {
    let app = create_app(Arc::new(MockTextGenerator::failing()), RelayMode::Stream);

    let response = app.oneshot(chat_request(r#""Hello""#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn given_stream_mode_when_upstream_breaks_mid_stream_then_body_ends_with_error() {
    let app = create_app(
        Arc::new(MockTextGenerator::interrupted_after(["Hel"])),
        RelayMode::Stream,
    );

    let response = app.oneshot(chat_request(r#""Hello""#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await;
    assert!(body.is_err());
}

#[tokio::test]
async fn given_request_without_id_when_any_endpoint_then_response_contains_request_id() {
    let app = create_app(Arc::new(MockTextGenerator::reply("x")), RelayMode::Batch);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn given_request_with_id_when_chat_endpoint_then_response_echoes_request_id() {
    let app = create_app(Arc::new(MockTextGenerator::reply("x")), RelayMode::Batch);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .header("x-request-id", "test-request-123")
                .body(Body::from(r#""Hi""#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "test-request-123"
    );
}
