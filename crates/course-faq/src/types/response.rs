//! Response types returned by the HTTP API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answer::{Answer, AnswerStatus};
use super::chat::ChatMessage;
use super::document::{Document, FileType};

/// FAQ answer response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqResponse {
    /// Answer with citation line already appended
    pub answer: String,
    pub status: AnswerStatus,
    /// Source filename for accepted answers
    pub source: Option<String>,
    /// Number of chunks sent to the model
    pub chunks_used: usize,
    /// Whether the question is written in Arabic script
    pub arabic_query: bool,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl FaqResponse {
    pub fn new(answer: &Answer, chunks_used: usize, arabic_query: bool, processing_time_ms: u64) -> Self {
        Self {
            answer: answer.render(),
            status: answer.status,
            source: answer.source.clone(),
            chunks_used,
            arabic_query,
            processing_time_ms,
        }
    }
}

/// General chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The message actually sent (may be the default summarize prompt)
    pub message: String,
    pub reply: String,
    pub processing_time_ms: u64,
}

/// Summary of the last answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub processing_time_ms: u64,
}

/// Loaded document summary with text preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub file_type: FileType,
    pub char_count: usize,
    pub chunk_count: usize,
    pub content_hash: String,
    pub preview: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl DocumentSummary {
    pub fn new(doc: &Document, chunk_count: usize, preview_chars: usize) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            file_type: doc.file_type,
            char_count: doc.char_count,
            chunk_count,
            content_hash: doc.content_hash.clone(),
            preview: doc.preview(preview_chars),
            uploaded_at: doc.uploaded_at,
        }
    }
}

/// Session overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub document: Option<String>,
    pub messages: usize,
    pub has_answer: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Transcript listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
}
