//! Prompt templates for grounded FAQ answers

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ScoredChunk;

/// Fixed answer whenever the document does not support a reply
pub const FALLBACK_ANSWER: &str = "I don't know — please ask the instructor.";

/// Visible separator between context chunks
pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Course the FAQ bot is answering for; controls the answer language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseProfile {
    /// Business Mathematics II, bilingual English/Arabic
    BusinessMathematics,
    /// Principles of Microeconomics, taught in Arabic
    Microeconomics,
    /// No language instruction
    #[default]
    General,
}

impl CourseProfile {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BusinessMathematics => "Business Mathematics II (Bilingual: EN + AR)",
            Self::Microeconomics => "Principles of Microeconomics (Arabic: MSA + light Qatari tone)",
            Self::General => "General",
        }
    }

    /// Trailing language line added to the FAQ prompt
    pub fn language_instruction(&self) -> Option<&'static str> {
        match self {
            Self::BusinessMathematics => Some(
                "If the question is in Arabic, answer in Arabic; if in English, answer in English. \
                 Keep Arabic formal but friendly.",
            ),
            Self::Microeconomics => Some(
                "Answer in Modern Standard Arabic using a light Qatari-friendly tone. \
                 Keep it professional and concise.",
            ),
            Self::General => None,
        }
    }
}

/// Crude script check: any character in the Arabic block
pub fn likely_arabic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

/// Prompt ready to send, with the context it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    /// Full prompt text
    pub prompt: String,
    /// Concatenated (possibly truncated) chunk text
    pub context: String,
    /// Chunks at least partly present in `context`
    pub chunks_used: usize,
    /// Whether the budget cut the context short
    pub truncated: bool,
}

/// Builds the FAQ prompt from ranked chunks under a character budget
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    context_budget: usize,
}

impl PromptAssembler {
    pub fn new(context_budget: usize) -> Self {
        Self { context_budget }
    }

    pub fn context_budget(&self) -> usize {
        self.context_budget
    }

    /// Join chunks in rank order, then cut the joined text to the budget.
    ///
    /// Truncation applies to the concatenation, so the tail of the lowest-ranked
    /// chunks goes first.
    pub fn build_context(&self, chunks: &[ScoredChunk<'_>]) -> (String, usize, bool) {
        let joined = chunks
            .iter()
            .map(|s| s.chunk.text)
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);

        if joined.chars().count() <= self.context_budget {
            return (joined, chunks.len(), false);
        }

        let context: String = joined.chars().take(self.context_budget).collect();

        // A chunk counts as used once any of its characters survives the cut.
        let mut used = 0;
        let mut offset = 0;
        for (i, scored) in chunks.iter().enumerate() {
            if i > 0 {
                offset += CHUNK_SEPARATOR.chars().count();
            }
            if offset >= self.context_budget {
                break;
            }
            used += 1;
            offset += scored.chunk.char_len();
        }

        (context, used, true)
    }

    /// Full FAQ prompt; `Error::NoContext` when there is nothing to ground on
    pub fn assemble(
        &self,
        question: &str,
        chunks: &[ScoredChunk<'_>],
        source_filename: &str,
        course: CourseProfile,
    ) -> Result<AssembledPrompt> {
        if chunks.is_empty() {
            return Err(Error::NoContext);
        }

        let (context, chunks_used, truncated) = self.build_context(chunks);

        let mut prompt = format!(
            r#"You are a course assistant. Use ONLY the CONTEXT below to answer the student's question.
If the answer is not in the context, reply exactly: "{fallback}"
Do not use outside knowledge. Keep answers concise and friendly.
End with a one-line citation naming the uploaded file: {source}

CONTEXT:
{context}

Question: {question}

Answer:"#,
            fallback = FALLBACK_ANSWER,
            source = source_filename,
            context = context,
            question = question.trim(),
        );

        if let Some(instruction) = course.language_instruction() {
            prompt.push_str("\n\n");
            prompt.push_str(instruction);
        }

        Ok(AssembledPrompt {
            prompt,
            context,
            chunks_used,
            truncated,
        })
    }
}
