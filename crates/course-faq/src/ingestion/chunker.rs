//! Fixed-size overlapping character windows

use crate::config::ChunkingConfig;
use crate::types::Chunk;

/// Text chunker with configurable size and overlap, both in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker.
    ///
    /// `chunk_size` is raised to at least 1 and `overlap` is clamped below it, so
    /// every window advances; `FaqConfig::validate` reports such settings up front.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily cut `text` into windows. Each call starts from the beginning.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            byte_pos: 0,
            char_pos: 0,
            index: 0,
            chunk_size: self.chunk_size,
            step: self.chunk_size - self.overlap,
            finished: text.is_empty(),
        }
    }
}

/// Iterator over the chunks of one text
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    byte_pos: usize,
    char_pos: usize,
    index: usize,
    chunk_size: usize,
    step: usize,
    finished: bool,
}

impl<'a> Chunks<'a> {
    /// Byte offset `n` characters after `self.byte_pos`, or the end of the text
    fn advance_chars(&self, n: usize) -> usize {
        self.text[self.byte_pos..]
            .char_indices()
            .nth(n)
            .map(|(i, _)| self.byte_pos + i)
            .unwrap_or(self.text.len())
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let text = self.text;
        let end = self.advance_chars(self.chunk_size);
        let chunk = Chunk {
            index: self.index,
            start: self.char_pos,
            text: &text[self.byte_pos..end],
        };

        // The window touching the end of the text is the last one.
        if end == text.len() {
            self.finished = true;
        } else {
            self.byte_pos = self.advance_chars(self.step);
            self.char_pos += self.step;
            self.index += 1;
        }

        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}
