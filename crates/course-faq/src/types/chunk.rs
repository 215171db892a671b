//! Retrieval units derived from a document

use serde::Serialize;

/// A window of document text.
///
/// Borrowed from the document it was cut from; `start` is a character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chunk<'a> {
    /// Position in document order
    pub index: usize,
    /// Character offset of the first character
    pub start: usize,
    /// The text itself
    pub text: &'a str,
}

impl<'a> Chunk<'a> {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Character offset one past the last character
    pub fn end(&self) -> usize {
        self.start + self.char_len()
    }
}

/// A chunk together with its keyword-overlap score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoredChunk<'a> {
    pub chunk: Chunk<'a>,
    /// Number of query keywords found in the chunk
    pub score: u32,
}
