//! Uploaded document type

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Supported upload formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Plain text file
    Txt,
    /// CSV file, flattened to an aligned table
    Csv,
    /// Anything else
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" | "text" => Self::Txt,
            "csv" => Self::Csv,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a filename
    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Txt => "Text File",
            Self::Csv => "CSV",
            Self::Unknown => "Unknown",
        }
    }
}

/// Extracted text of the currently loaded course document.
///
/// A session owns at most one; a new upload replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename as uploaded by user
    pub filename: String,
    /// File type
    pub file_type: FileType,
    /// Extracted plain text
    pub text: String,
    /// SHA-256 of the extracted text
    pub content_hash: String,
    /// Length of `text` in characters
    pub char_count: usize,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a document from extracted text
    pub fn new(filename: impl Into<String>, file_type: FileType, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            file_type,
            content_hash: hash_content(&text),
            char_count: text.chars().count(),
            text,
            uploaded_at: chrono::Utc::now(),
        }
    }

    /// First `max_chars` characters, with "..." appended when the text is longer
    pub fn preview(&self, max_chars: usize) -> String {
        if self.char_count <= max_chars {
            return self.text.clone();
        }
        let mut preview: String = self.text.chars().take(max_chars).collect();
        preview.push_str("...");
        preview
    }
}

/// Hash content for change detection
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
