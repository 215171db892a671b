//! API routes for the FAQ server

pub mod chat;
pub mod documents;
pub mod faq;
pub mod sessions;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        // Course document, with larger body limit for uploads
        .route(
            "/sessions/:id/document",
            post(documents::upload_document)
                .layer(DefaultBodyLimit::max(max_upload_size))
                .get(documents::get_document),
        )
        // Grounded FAQ
        .route("/sessions/:id/faq", post(faq::ask_faq))
        // General chat
        .route("/sessions/:id/chat", post(chat::chat))
        .route("/sessions/:id/summarize", post(chat::summarize))
        .route(
            "/sessions/:id/transcript",
            get(sessions::get_transcript).delete(sessions::clear_transcript),
        )
        .route("/sessions/:id/transcript/export", get(sessions::export_transcript))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let provider = state.assistant().provider();
    let config = state.config();

    Json(serde_json::json!({
        "name": "course-faq",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Course FAQ assistant that answers only from the uploaded document",
        "provider": provider.name(),
        "model": provider.model(),
        "course": config.course.display_name(),
        "chunking": {
            "chunk_size": config.chunking.chunk_size,
            "chunk_overlap": config.chunking.chunk_overlap,
        },
        "retrieval": {
            "top_k": config.retrieval.top_k,
            "context_budget": config.retrieval.context_budget,
        },
        "endpoints": {
            "POST /api/sessions": "Start a session",
            "GET /api/sessions/:id": "Session overview",
            "DELETE /api/sessions/:id": "End a session",
            "POST /api/sessions/:id/document": "Upload the course document (PDF, DOCX, TXT, CSV)",
            "GET /api/sessions/:id/document": "Loaded document summary and text preview",
            "POST /api/sessions/:id/faq": "Ask a question answered only from the document",
            "POST /api/sessions/:id/chat": "General chat turn",
            "POST /api/sessions/:id/summarize": "Summarize the last answer",
            "GET /api/sessions/:id/transcript": "Chat transcript",
            "DELETE /api/sessions/:id/transcript": "Clear the chat transcript",
            "GET /api/sessions/:id/transcript/export": "Chat transcript as CSV"
        }
    }))
}
