//! FAQ, general chat and summarization operations over a session

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ChatConfig, FaqConfig};
use crate::error::{Error, Result};
use crate::generation::{
    likely_arabic, AnswerGate, CourseProfile, GateDecision, GroundingCheck, PromptAssembler,
    QueryState, SamplingParams,
};
use crate::ingestion::TextChunker;
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::retrieval::KeywordScorer;
use crate::session::Session;
use crate::types::{
    ChatMessage, ChatResponse, Document, DocumentSummary, FaqRequest, FaqResponse,
    SummaryResponse,
};

/// Chat input used when the user sends nothing while a document is loaded
pub const DEFAULT_CHAT_PROMPT: &str = "Summarize the uploaded document.";

/// System prompt for summarizing the last answer
pub const SUMMARY_PROMPT: &str = "Summarize the following answer clearly and concisely.";

/// Ties chunking, scoring and the answer gate to a completion provider
pub struct Assistant {
    chunker: TextChunker,
    scorer: KeywordScorer,
    gate: AnswerGate,
    course: CourseProfile,
    chat: ChatConfig,
}

impl Assistant {
    pub fn new(config: &FaqConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let sampling = SamplingParams {
            temperature: config.completion.temperature,
            max_tokens: config.completion.max_tokens,
        };
        let gate = AnswerGate::new(
            provider,
            PromptAssembler::new(config.retrieval.context_budget),
            sampling,
        );

        Self {
            chunker: TextChunker::from_config(&config.chunking),
            scorer: KeywordScorer::from_config(&config.retrieval),
            gate,
            course: config.course,
            chat: config.chat.clone(),
        }
    }

    /// Replace the post-generation grounding check
    pub fn with_check(mut self, check: Arc<dyn GroundingCheck>) -> Self {
        self.gate = self.gate.with_check(check);
        self
    }

    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        self.gate.provider()
    }

    pub fn course(&self) -> CourseProfile {
        self.course
    }

    /// Summary of a loaded document with its text preview
    pub fn describe(&self, document: &Document) -> DocumentSummary {
        let chunk_count = self.chunker.chunks(&document.text).count();
        DocumentSummary::new(document, chunk_count, self.chat.preview_chars)
    }

    /// Answer `question` strictly from `document`.
    ///
    /// The model is only called when at least one chunk scores above zero.
    pub async fn answer(
        &self,
        document: &Document,
        question: &str,
        course: CourseProfile,
        top_k: Option<usize>,
    ) -> Result<GateDecision> {
        let scorer = match top_k {
            Some(k) => self.scorer.clone().with_top_k(k),
            None => self.scorer.clone(),
        };

        let query = scorer.parse_query(question);
        AnswerGate::transition(&query, QueryState::Idle, QueryState::Scoring);
        let selected = scorer.rank(&query, self.chunker.chunks(&document.text));
        tracing::debug!(
            "{} keywords, {} chunks selected from {}",
            query.keywords.len(),
            selected.len(),
            document.filename
        );

        self.gate
            .answer(&query, &selected, &document.filename, course)
            .await
    }

    /// FAQ mode: grounded answer from the session's document
    pub async fn ask_faq(&self, session: &Session, request: &FaqRequest) -> Result<FaqResponse> {
        let start = Instant::now();

        let question = request.question.trim();
        if question.is_empty() {
            return Err(Error::EmptyQuestion);
        }
        let document = session.document().ok_or(Error::NoDocument)?;
        let course = request.course.unwrap_or(self.course);

        tracing::info!(session = %session.id(), "FAQ: \"{}\"", question);

        let decision = self
            .answer(&document, question, course, request.top_k)
            .await?;

        tracing::info!(
            session = %session.id(),
            fallback = decision.answer.is_fallback(),
            "FAQ answered from {} chunks",
            decision.chunks_used
        );

        let rendered = decision.answer.render();
        session.set_last_answer(rendered);

        Ok(FaqResponse::new(
            &decision.answer,
            decision.chunks_used,
            likely_arabic(question),
            start.elapsed().as_millis() as u64,
        ))
    }

    /// General chat turn, optionally grounded on the first part of the loaded document.
    ///
    /// A failed call still records an error-tagged assistant message in the transcript.
    pub async fn chat(&self, session: &Session, message: &str) -> Result<ChatResponse> {
        let start = Instant::now();
        let document = session.document();

        let message = match (message.trim(), &document) {
            ("", Some(_)) => DEFAULT_CHAT_PROMPT.to_string(),
            ("", None) => return Err(Error::EmptyQuestion),
            (text, _) => text.to_string(),
        };

        session.push_message(ChatMessage::user(message.clone()));

        let content = match &document {
            Some(doc) => format!(
                "File content:\n{}\n\nQuestion: {}",
                leading_chars(&doc.text, self.chat.file_context_chars),
                message
            ),
            None => message.clone(),
        };

        let provider = self.provider();
        let request = CompletionRequest {
            model: provider.model().to_string(),
            messages: vec![ChatMessage::user(content)],
            temperature: self.gate_temperature(),
            max_tokens: None,
        };

        match provider.complete(&request).await {
            Ok(reply) => {
                session.push_message(ChatMessage::assistant(reply.clone()));
                session.set_last_answer(reply.clone());
                Ok(ChatResponse {
                    message,
                    reply,
                    processing_time_ms: start.elapsed().as_millis() as u64,
                })
            }
            Err(e) => {
                tracing::warn!(session = %session.id(), "Chat failed: {}", e);
                session.push_message(ChatMessage::assistant(e.user_message()));
                Err(e)
            }
        }
    }

    /// Short summary of the session's last answer
    pub async fn summarize(&self, session: &Session) -> Result<SummaryResponse> {
        let start = Instant::now();
        let answer = session.last_answer().ok_or(Error::NothingToSummarize)?;

        let provider = self.provider();
        let request = CompletionRequest {
            model: provider.model().to_string(),
            messages: vec![ChatMessage::system(SUMMARY_PROMPT), ChatMessage::user(answer)],
            temperature: self.chat.summary_temperature,
            max_tokens: Some(self.chat.summary_max_tokens),
        };

        let summary = provider.complete(&request).await?;

        Ok(SummaryResponse {
            summary: summary.trim().to_string(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn gate_temperature(&self) -> f32 {
        self.gate.sampling().temperature
    }
}

/// First `n` characters of `text`
fn leading_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
