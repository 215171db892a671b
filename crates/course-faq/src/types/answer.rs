//! FAQ answers

use serde::{Deserialize, Serialize};

use crate::generation::FALLBACK_ANSWER;

/// How an answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Nothing in the document matched; the model was never called
    Fallback,
    /// Model output surfaced as-is
    Accepted,
    /// Model output replaced by the fallback by the grounding check
    Overridden,
}

/// Generated answer with optional citation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text (model output or the fixed fallback)
    pub text: String,
    /// Source filename, present only for accepted answers
    pub source: Option<String>,
    pub status: AnswerStatus,
}

impl Answer {
    /// The fixed "I don't know" answer
    pub fn fallback(status: AnswerStatus) -> Self {
        Self {
            text: FALLBACK_ANSWER.to_string(),
            source: None,
            status,
        }
    }

    /// A model answer citing `source`
    pub fn accepted(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: Some(source.into()),
            status: AnswerStatus::Accepted,
        }
    }

    /// Whether the fixed fallback is being returned
    pub fn is_fallback(&self) -> bool {
        !matches!(self.status, AnswerStatus::Accepted)
    }

    /// Text with the citation line appended
    pub fn render(&self) -> String {
        match &self.source {
            Some(source) => format!("{}\n\nSource: [{}]", self.text, source),
            None => self.text.clone(),
        }
    }
}
