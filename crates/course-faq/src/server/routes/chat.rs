//! General chat and summarization endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse, SummaryResponse};

/// POST /api/sessions/:id/chat - One chat turn
pub async fn chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let session = state.sessions().get(&id)?;
    Ok(Json(state.assistant().chat(&session, &request.message).await?))
}

/// POST /api/sessions/:id/summarize - Summarize the last answer
pub async fn summarize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>> {
    let session = state.sessions().get(&id)?;
    Ok(Json(state.assistant().summarize(&session).await?))
}
