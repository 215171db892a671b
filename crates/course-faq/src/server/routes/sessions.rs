//! Session lifecycle and transcript endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{Role, SessionSummary, Transcript, TranscriptResponse};

/// POST /api/sessions - Start a session
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSummary>) {
    let session = state.sessions().create();
    (StatusCode::CREATED, Json(session.summary()))
}

/// GET /api/sessions/:id - Session overview
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>> {
    Ok(Json(state.sessions().get(&id)?.summary()))
}

/// DELETE /api/sessions/:id - End a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions().remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:id/transcript - Chat transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>> {
    let session = state.sessions().get(&id)?;
    Ok(Json(TranscriptResponse {
        session_id: id,
        messages: session.transcript().messages().to_vec(),
    }))
}

/// DELETE /api/sessions/:id/transcript - Clear the chat
pub async fn clear_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions().get(&id)?.clear_transcript();
    tracing::info!(session = %id, "Transcript cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:id/transcript/export - Transcript as a CSV download
pub async fn export_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let transcript = state.sessions().get(&id)?.transcript();
    let body = transcript_csv(&transcript)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"course_faq_chat.csv\"",
            ),
        ],
        body,
    ))
}

/// `role,content` rows with a header line
pub fn transcript_csv(transcript: &Transcript) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(["role", "content"])
        .map_err(|e| Error::internal(format!("CSV export failed: {}", e)))?;

    for message in transcript.messages() {
        let role = match message.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        writer
            .write_record([role, message.content.as_str()])
            .map_err(|e| Error::internal(format!("CSV export failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::internal(format!("CSV export failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::internal(format!("CSV export failed: {}", e)))
}
