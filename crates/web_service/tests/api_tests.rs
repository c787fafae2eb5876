//! End-to-end tests for the HTTP surface against a mocked upstream.

use std::sync::Arc;

use actix_web::{test, web, App};
use chat_core::Config;
use conversation_store::ConversationStore;
use futures_util::StreamExt;
use persona_filter::PersonaFilter;
use serde_json::{json, Value};
use upstream_client::UpstreamClient;
use web_service::services::ChatService;
use web_service::{app_config, AppState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_for(server: &MockServer, admin_bypass: bool) -> AppState {
    let config = Config::default()
        .with_api_key("test-key")
        .with_api_base(server.uri());
    let mut state = AppState::from_config(&config);
    state.admin_bypass = admin_bypass;
    state
}

async fn mock_complete_response(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_01",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn"
        })))
        .mount(server)
        .await;
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(app_config),
        )
        .await
    };
}

#[actix_web::test]
async fn health_endpoint_responds() {
    let server = MockServer::start().await;
    let app = test_app!(state_for(&server, false));

    let req = test::TestRequest::get().uri("/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn empty_text_is_rejected_before_upstream() {
    let server = MockServer::start().await;
    let app = test_app!(state_for(&server, false));

    let req = test::TestRequest::post()
        .uri("/v1/sessions/s1/messages")
        .set_json(json!({"text": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "validation_error");
    // No upstream request was made.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[actix_web::test]
async fn missing_api_key_is_a_configuration_error() {
    let app = test_app!(AppState::from_config(&Config::default()));

    let req = test::TestRequest::post()
        .uri("/v1/sessions/s1/messages")
        .set_json(json!({"text": "hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "configuration_error");
}

#[actix_web::test]
async fn blocking_exchange_rewrites_and_persists() {
    let server = MockServer::start().await;
    mock_complete_response(&server, "I am Claude, made by Anthropic.").await;
    let app = test_app!(state_for(&server, false));

    let req = test::TestRequest::post()
        .uri("/v1/sessions/s1/messages")
        .set_json(json!({"text": "Who are you?"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["reply"], "I am Verdi.");
    assert_eq!(body["bypassed"], false);

    let req = test::TestRequest::get()
        .uri("/v1/sessions/s1/messages")
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"][0]["text"], "I am Verdi.");
}

#[actix_web::test]
async fn admin_bypass_skips_the_filter() {
    let server = MockServer::start().await;
    mock_complete_response(&server, "I am Claude, made by Anthropic.").await;
    let app = test_app!(state_for(&server, true));

    let req = test::TestRequest::post()
        .uri("/v1/sessions/s1/messages")
        .set_json(json!({"text": "Who are you?"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["reply"], "I am Claude, made by Anthropic.");
    assert_eq!(body["bypassed"], true);
}

#[actix_web::test]
async fn clear_session_is_idempotent() {
    let server = MockServer::start().await;
    mock_complete_response(&server, "Hi there!").await;
    let app = test_app!(state_for(&server, false));

    let req = test::TestRequest::post()
        .uri("/v1/sessions/s1/messages")
        .set_json(json!({"text": "Hello"}))
        .to_request();
    test::call_service(&app, req).await;

    for _ in 0..2 {
        let req = test::TestRequest::delete().uri("/v1/sessions/s1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    let req = test::TestRequest::get()
        .uri("/v1/sessions/s1/messages")
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert!(history["messages"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn streaming_exchange_forwards_frames_and_persists_on_done() {
    let server = MockServer::start().await;
    let sse_body = concat!(
        "data: {\"delta\":{\"text\":\"Hi \"}}\n",
        "data: {\"delta\":{\"text\":\"there!\"}}\n",
        "data: [DONE]\n",
    );
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body),
        )
        .mount(&server)
        .await;
    let app = test_app!(state_for(&server, false));

    let req = test::TestRequest::post()
        .uri("/v1/sessions/s1/messages/stream")
        .set_json(json!({"text": "Hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let body = test::read_body(resp).await;
    assert_eq!(
        body,
        "data: {\"delta\":\"Hi \"}\n\ndata: {\"delta\":\"there!\"}\n\ndata: [DONE]\n\n"
    );

    let req = test::TestRequest::get()
        .uri("/v1/sessions/s1/messages")
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["content"][0]["text"], "Hi there!");
}

#[actix_web::test]
async fn streaming_error_frame_leaves_no_assistant_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;
    let app = test_app!(state_for(&server, false));

    let req = test::TestRequest::post()
        .uri("/v1/sessions/s1/messages/stream")
        .set_json(json!({"text": "Hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // Upstream rejected before any bytes flowed: structured error result.
    assert_eq!(resp.status(), 502);

    let req = test::TestRequest::get()
        .uri("/v1/sessions/s1/messages")
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
}

#[actix_web::test]
async fn cancelled_stream_discards_partial_turn() {
    let server = MockServer::start().await;
    let sse_body = concat!(
        "data: {\"delta\":{\"text\":\"one \"}}\n",
        "data: {\"delta\":{\"text\":\"two \"}}\n",
        "data: {\"delta\":{\"text\":\"three \"}}\n",
        "data: {\"delta\":{\"text\":\"four \"}}\n",
        "data: {\"delta\":{\"text\":\"five\"}}\n",
        "data: [DONE]\n",
    );
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body),
        )
        .mount(&server)
        .await;

    let config = Config::default()
        .with_api_key("test-key")
        .with_api_base(server.uri());
    let store = Arc::new(ConversationStore::new());
    let service = ChatService::new(
        Arc::clone(&store),
        Some(Arc::new(UpstreamClient::from_config(&config).unwrap())),
        Arc::new(PersonaFilter::new()),
        false,
    );

    let body = web_service::models::SendMessageRequestBody {
        text: "Hello".to_string(),
        model: None,
        max_tokens: None,
    };
    let stream = service.process_message_stream("s1", &body).await.unwrap();

    // Consumer aborts after two of the five deltas.
    let received: Vec<_> = Box::pin(stream).take(2).collect().await;
    assert_eq!(received.len(), 2);

    let history = store.get("s1");
    assert_eq!(history.len(), 1, "no assistant turn may be persisted");
}
