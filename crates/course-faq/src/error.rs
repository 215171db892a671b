//! Error types for the course FAQ assistant

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::FALLBACK_ANSWER;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Assistant errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Uploaded file could not be turned into text
    #[error("Failed to extract text from '{filename}': {message}")]
    Extraction { filename: String, message: String },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Missing or rejected credential
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network failure or timeout talking to the completion endpoint
    #[error("Request failed: {0}")]
    Request(String),

    /// Completion endpoint answered with a non-success status
    #[error("Provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    /// No chunk matched the question. Never surfaced raw; mapped to the fallback answer.
    #[error("No matching context in the uploaded document")]
    NoContext,

    /// FAQ asked before any document was uploaded
    #[error("No course document uploaded. Please upload the syllabus or course document and try again.")]
    NoDocument,

    /// Blank question
    #[error("Please type a question.")]
    EmptyQuestion,

    /// Summarize requested before any answer exists
    #[error("There is no previous answer to summarize.")]
    NothingToSummarize,

    /// Unknown session id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a request error
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Create a provider error
    pub fn provider(status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            status,
            body: body.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether retrying the same action by hand can succeed without the user changing anything
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Request(_) => true,
            Error::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Error-tagged string shown to the user for a failed action
    pub fn user_message(&self) -> String {
        match self {
            Error::NoContext => FALLBACK_ANSWER.to_string(),
            other => format!("Error: {}", other),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::Config(_) => (StatusCode::BAD_REQUEST, "config_error"),
            Error::Extraction { .. } => (StatusCode::BAD_REQUEST, "extraction_error"),
            Error::UnsupportedFileType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_type")
            }
            Error::Auth(_) => (StatusCode::UNAUTHORIZED, "auth_error"),
            Error::Request(_) => (StatusCode::GATEWAY_TIMEOUT, "request_error"),
            Error::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
            Error::NoContext => {
                // Internal signal only; the caller still gets the fixed fallback sentence.
                let body = Json(json!({ "answer": FALLBACK_ANSWER, "status": "fallback" }));
                return (StatusCode::OK, body).into_response();
            }
            Error::NoDocument => (StatusCode::CONFLICT, "no_document"),
            Error::EmptyQuestion => (StatusCode::BAD_REQUEST, "empty_question"),
            Error::NothingToSummarize => (StatusCode::CONFLICT, "nothing_to_summarize"),
            Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
                "display": self.user_message(),
            }
        }));

        (status, body).into_response()
    }
}
