//! Keyword-overlap retrieval over document chunks

mod scorer;

pub use scorer::{contains_any_keyword, tokenize, KeywordScorer};
