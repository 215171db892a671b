//! End-to-end HTTP routes with the offline rule-based provider.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use course_faq::{
    config::FaqConfig,
    providers::RuleBasedProvider,
    server::{build_router, state::AppState},
    FALLBACK_ANSWER,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "course-faq-test-boundary";
const REFUND_DOC: &str = "The refund deadline is March 3. Late submissions are not accepted.";

fn app() -> Router {
    let state = AppState::new(FaqConfig::default(), Arc::new(RuleBasedProvider::new()));
    build_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let (status, bytes) = send(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn upload_request(session_id: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY,
            f = filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(format!("/api/sessions/{}/document", session_id))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send_json(app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_info() {
    let app = app();
    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, info) = send_json(&app, Method::GET, "/api/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["provider"], "rule_based");
    assert_eq!(info["retrieval"]["top_k"], 5);
}

#[tokio::test]
async fn test_faq_flow() {
    let app = app();
    let id = new_session(&app).await;

    // Asking before any upload
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/faq", id),
        Some(json!({ "question": "When is the refund deadline?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "no_document");

    let (status, bytes) = send(&app, upload_request(&id, "policy.txt", REFUND_DOC.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    let summary: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary["filename"], "policy.txt");
    assert_eq!(summary["file_type"], "txt");
    assert_eq!(summary["chunk_count"], 1);
    assert_eq!(summary["preview"], REFUND_DOC);

    // Matching question reaches the model and is cited
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/faq", id),
        Some(json!({ "question": "When is the refund deadline?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["source"], "policy.txt");
    assert_eq!(body["chunks_used"], 1);
    assert!(body["answer"]
        .as_str()
        .unwrap()
        .ends_with("\n\nSource: [policy.txt]"));

    // Unrelated question never reaches the model
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/faq", id),
        Some(json!({ "question": "What is the weather today?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], FALLBACK_ANSWER);
    assert_eq!(body["status"], "fallback");
    assert_eq!(body["chunks_used"], 0);

    // Blank question
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/faq", id),
        Some(json!({ "question": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "empty_question");
}

#[tokio::test]
async fn test_upload_replaces_document_and_rejects_unknown_types() {
    let app = app();
    let id = new_session(&app).await;

    let (status, _) = send(&app, upload_request(&id, "policy.txt", REFUND_DOC.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, upload_request(&id, "gdp.csv", b"country,gdp\nQatar,87661\n")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, doc) = send_json(&app, Method::GET, &format!("/api/sessions/{}/document", id), None).await;
    assert_eq!(doc["filename"], "gdp.csv");
    assert_eq!(doc["preview"], "country   gdp\n  Qatar 87661");

    let (status, bytes) = send(&app, upload_request(&id, "slides.pptx", b"PK\x03\x04")).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["type"], "unsupported_type");

    // The failed upload left the previous document in place
    let (_, doc) = send_json(&app, Method::GET, &format!("/api/sessions/{}/document", id), None).await;
    assert_eq!(doc["filename"], "gdp.csv");
}

#[tokio::test]
async fn test_chat_summarize_and_transcript() {
    let app = app();
    let id = new_session(&app).await;

    // Nothing answered yet
    let (status, body) = send_json(&app, Method::POST, &format!("/api/sessions/{}/summarize", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "nothing_to_summarize");

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/chat", id),
        Some(json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Hi there! 👋");

    let (status, body) = send_json(&app, Method::POST, &format!("/api/sessions/{}/summarize", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["summary"].is_string());

    let (_, transcript) = send_json(&app, Method::GET, &format!("/api/sessions/{}/transcript", id), None).await;
    let messages = transcript["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], json!({ "role": "user", "content": "hello" }));
    assert_eq!(messages[1]["role"], "assistant");

    let (status, csv) = send(
        &app,
        Request::builder()
            .uri(format!("/api/sessions/{}/transcript/export", id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(csv).unwrap();
    assert!(csv.starts_with("role,content\nuser,hello\n"));

    let (status, _) = send_json(&app, Method::DELETE, &format!("/api/sessions/{}/transcript", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, session) = send_json(&app, Method::GET, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(session["messages"], 0);
    assert_eq!(session["has_answer"], true);
}

#[tokio::test]
async fn test_empty_chat_with_document_summarizes_it() {
    let app = app();
    let id = new_session(&app).await;
    let (status, _) = send(&app, upload_request(&id, "policy.txt", REFUND_DOC.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/chat", id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Summarize the uploaded document.");
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = app();
    let id = new_session(&app).await;

    let (status, _) = send_json(&app, Method::DELETE, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(&app, Method::GET, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");
}
