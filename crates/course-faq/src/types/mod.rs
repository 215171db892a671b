//! Core types for the FAQ assistant

pub mod answer;
pub mod chat;
pub mod chunk;
pub mod document;
pub mod query;
pub mod response;

pub use answer::{Answer, AnswerStatus};
pub use chat::{ChatMessage, Role, Transcript};
pub use chunk::{Chunk, ScoredChunk};
pub use document::{Document, FileType};
pub use query::{ChatRequest, FaqRequest, Query};
pub use response::{
    ChatResponse, DocumentSummary, FaqResponse, SessionSummary, SummaryResponse,
    TranscriptResponse,
};
