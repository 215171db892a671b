//! HTTP completion client against a throwaway local endpoint.

use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use course_faq::{
    providers::OpenAiCompatClient, types::ChatMessage, CompletionProvider, CompletionRequest,
    Error, ProviderKind,
};
use serde_json::{json, Value};

async fn ok_handler(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer test-key");
    if !authorized || body["model"] != "test-model" || body["messages"][0]["role"] != "user" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "unexpected request" })));
    }

    let echoed = body["messages"][0]["content"].as_str().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": format!("echo: {}", echoed) } }]
        })),
    )
}

async fn unauthorized() -> (StatusCode, &'static str) {
    (StatusCode::UNAUTHORIZED, "invalid api key")
}

async fn server_error() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn no_choices() -> Json<Value> {
    Json(json!({ "choices": [] }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "choices": [] }))
}

/// Serve the fake endpoints on an ephemeral port and return the base URL
async fn spawn_endpoint() -> String {
    let app = Router::new()
        .route("/ok/chat/completions", post(ok_handler))
        .route("/unauthorized/chat/completions", post(unauthorized))
        .route("/error/chat/completions", post(server_error))
        .route("/empty/chat/completions", post(no_choices))
        .route("/slow/chat/completions", post(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base: &str, path: &str, timeout: Duration) -> OpenAiCompatClient {
    OpenAiCompatClient::new(
        ProviderKind::OpenAi,
        format!("{}/{}/chat/completions", base, path),
        "test-model",
        Some("test-key".to_string()),
        timeout,
    )
    .unwrap()
}

fn request() -> CompletionRequest {
    CompletionRequest {
        model: "test-model".to_string(),
        messages: vec![ChatMessage::user("When is the quiz?")],
        temperature: 0.0,
        max_tokens: Some(50),
    }
}

#[tokio::test]
async fn test_success_returns_first_choice() {
    let base = spawn_endpoint().await;
    let reply = client(&base, "ok", Duration::from_secs(5))
        .complete(&request())
        .await
        .unwrap();
    assert_eq!(reply, "echo: When is the quiz?");
}

#[tokio::test]
async fn test_401_is_auth_error() {
    let base = spawn_endpoint().await;
    let err = client(&base, "unauthorized", Duration::from_secs(5))
        .complete(&request())
        .await
        .unwrap_err();
    match &err {
        Error::Auth(message) => {
            assert!(message.contains("HTTP 401"), "got {}", message);
            assert!(message.contains("invalid api key"), "got {}", message);
        }
        other => panic!("expected auth error, got {:?}", other),
    }
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_500_is_provider_error_with_body() {
    let base = spawn_endpoint().await;
    let err = client(&base, "error", Duration::from_secs(5))
        .complete(&request())
        .await
        .unwrap_err();
    match err {
        Error::Provider { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_is_provider_error() {
    let base = spawn_endpoint().await;
    let err = client(&base, "empty", Duration::from_secs(5))
        .complete(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider { status: 200, .. }));
}

#[tokio::test]
async fn test_timeout_is_request_error() {
    let base = spawn_endpoint().await;
    let err = client(&base, "slow", Duration::from_millis(200))
        .complete(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Request(_)), "got {:?}", err);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr), "ok", Duration::from_secs(2))
        .complete(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Request(_)), "got {:?}", err);
}
