//! Course document upload endpoint

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::TextExtractor;
use crate::server::state::AppState;
use crate::types::DocumentSummary;

/// POST /api/sessions/:id/document - Upload and extract the course document.
///
/// The first file field is used; it replaces any document already loaded.
pub async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<DocumentSummary>> {
    let start = Instant::now();
    let session = state.sessions().get(&id)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("Failed to read multipart field: {}", e)))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Internal(format!("Failed to read file: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| Error::extraction("upload", "no file field in the request"))?;

    tracing::info!(session = %id, "Processing file: {} ({} bytes)", filename, data.len());

    // PDF parsing is CPU-bound and may block for a while
    let document = tokio::task::spawn_blocking(move || TextExtractor::extract(&filename, &data))
        .await
        .map_err(|e| Error::internal(format!("Extraction task failed: {}", e)))??;

    let summary = state.assistant().describe(&document);
    session.set_document(document);

    tracing::info!(
        session = %id,
        "Loaded {} ({} chars, {} chunks) in {}ms",
        summary.filename,
        summary.char_count,
        summary.chunk_count,
        start.elapsed().as_millis()
    );

    Ok(Json(summary))
}

/// GET /api/sessions/:id/document - Loaded document summary and preview
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentSummary>> {
    let document = state
        .sessions()
        .get(&id)?
        .document()
        .ok_or(Error::NoDocument)?;
    Ok(Json(state.assistant().describe(&document)))
}
