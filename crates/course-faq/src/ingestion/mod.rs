//! Document ingestion: text extraction and chunking

mod chunker;
mod parser;

pub use chunker::{Chunks, TextChunker};
pub use parser::TextExtractor;
