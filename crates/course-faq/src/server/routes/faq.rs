//! Grounded FAQ endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{FaqRequest, FaqResponse};

/// POST /api/sessions/:id/faq - Answer only from the uploaded document
pub async fn ask_faq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FaqRequest>,
) -> Result<Json<FaqResponse>> {
    let session = state.sessions().get(&id)?;
    let response = state.assistant().ask_faq(&session, &request).await?;

    tracing::info!(
        session = %id,
        "FAQ answered ({:?}, {} chunks, {}ms)",
        response.status,
        response.chunks_used,
        response.processing_time_ms
    );

    Ok(Json(response))
}
