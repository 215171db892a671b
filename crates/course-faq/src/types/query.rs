//! Query request types

use serde::{Deserialize, Serialize};

use crate::generation::CourseProfile;

/// A single user question, tokenized for keyword scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// The question as typed
    pub text: String,
    /// Lowercased keywords, in question order, duplicates kept
    pub keywords: Vec<String>,
}

impl Query {
    /// Whether no usable keyword survived tokenization
    pub fn has_keywords(&self) -> bool {
        !self.keywords.is_empty()
    }
}

/// FAQ request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqRequest {
    /// The question to answer
    pub question: String,

    /// Course profile override (default: server configuration)
    #[serde(default)]
    pub course: Option<CourseProfile>,

    /// Number of chunks to select (default: server configuration, at most 5)
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl FaqRequest {
    /// Create a new request
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            course: None,
            top_k: None,
        }
    }
}

/// General chat request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message; empty means "summarize the uploaded document" when one is loaded
    #[serde(default)]
    pub message: String,
}
