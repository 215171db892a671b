//! course-faq: document-grounded course FAQ assistant
//!
//! A student uploads one course document (PDF, DOCX, TXT or CSV) and asks questions.
//! Answers come only from that document: questions with no keyword overlap get a fixed
//! "I don't know" reply without any model call, and model output that fails the
//! grounding check is replaced by the same reply. A general chat mode and answer
//! summarization sit alongside, all behind one `CompletionProvider` interface.

pub mod assistant;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod secrets;
pub mod server;
pub mod session;
pub mod types;

pub use assistant::Assistant;
pub use config::FaqConfig;
pub use error::{Error, Result};
pub use generation::{CourseProfile, FALLBACK_ANSWER};
pub use providers::{build_provider, CompletionProvider, CompletionRequest, ProviderKind};
pub use session::{Session, SessionStore};
pub use types::{Answer, AnswerStatus, Chunk, Document, FileType, ScoredChunk};
