//! Keyword-overlap relevance scoring.
//!
//! Not semantic search: a chunk's score is the number of query keywords that occur
//! as substrings of its lowercased text. Chunks scoring zero are never returned, and
//! an empty ranking is the signal that the question has no support in the document.

use crate::config::{RetrievalConfig, MAX_TOP_K};
use crate::types::{Chunk, Query, ScoredChunk};

/// Common English function and question words, dropped before scoring
const STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could",
    "did", "do", "does", "for", "from", "had", "has", "have", "how", "i", "if", "in", "into",
    "is", "it", "its", "me", "my", "of", "on", "or", "our", "please", "should", "so", "tell",
    "than", "that", "the", "their", "them", "there", "these", "they", "this", "those", "to",
    "was", "we", "were", "what", "when", "where", "which", "who", "whom", "why", "will",
    "with", "would", "you", "your",
];

/// Lowercase, split on whitespace, trim surrounding punctuation, drop short tokens
/// and (optionally) stopwords. Order and duplicates are kept.
pub fn tokenize(text: &str, min_len: usize, use_stopwords: bool) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| t.chars().count() >= min_len.max(1))
        .filter(|t| !(use_stopwords && STOPWORDS.contains(t)))
        .map(str::to_string)
        .collect()
}

/// Whether any query keyword occurs in `text` (case-insensitive)
pub fn contains_any_keyword(query: &Query, text: &str) -> bool {
    let lowered = text.to_lowercase();
    query.keywords.iter().any(|k| lowered.contains(k.as_str()))
}

/// Ranks chunks by keyword overlap with a query
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    top_k: usize,
    min_token_len: usize,
    use_stopwords: bool,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

impl KeywordScorer {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            top_k: config.top_k.clamp(1, MAX_TOP_K),
            min_token_len: config.min_token_len,
            use_stopwords: config.use_stopwords,
        }
    }

    /// Same scorer with a different selection size, kept within `1..=MAX_TOP_K`
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.clamp(1, MAX_TOP_K);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Tokenize a question
    pub fn parse_query(&self, text: &str) -> Query {
        Query {
            text: text.to_string(),
            keywords: tokenize(text, self.min_token_len, self.use_stopwords),
        }
    }

    /// Number of query keywords present in the chunk
    pub fn score(&self, query: &Query, chunk: &Chunk<'_>) -> u32 {
        let lowered = chunk.text.to_lowercase();
        query
            .keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .count() as u32
    }

    /// Top-k chunks by descending score; ties keep document order, zero scores are dropped
    pub fn rank<'a, I>(&self, query: &Query, chunks: I) -> Vec<ScoredChunk<'a>>
    where
        I: IntoIterator<Item = Chunk<'a>>,
    {
        if !query.has_keywords() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredChunk<'a>> = chunks
            .into_iter()
            .map(|chunk| ScoredChunk {
                score: self.score(query, &chunk),
                chunk,
            })
            .filter(|s| s.score > 0)
            .collect();

        // sort_by is stable, so equal scores stay in chunk order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.top_k);
        scored
    }
}
