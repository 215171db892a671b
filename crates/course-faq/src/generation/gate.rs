//! Answer gate: decides between the model's answer and the fixed fallback.
//!
//! Per question the gate walks
//! `Idle → Scoring → NoMatch → AnsweringFallback` when nothing matched, or
//! `Idle → Scoring → Matched → CallingModel → Accepted | OverriddenToFallback | Failed`.
//! There are no retries; `Failed` carries the completion error back to the caller.

use std::fmt;
use std::sync::Arc;

use super::prompt::{CourseProfile, PromptAssembler};
use crate::error::{Error, Result};
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::retrieval::contains_any_keyword;
use crate::types::{Answer, AnswerStatus, ChatMessage, Query, ScoredChunk};

/// Per-query lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    Scoring,
    NoMatch,
    AnsweringFallback,
    Matched,
    CallingModel,
    Accepted,
    OverriddenToFallback,
    Failed,
}

impl QueryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AnsweringFallback | Self::Accepted | Self::OverriddenToFallback | Self::Failed
        )
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Scoring => "scoring",
            Self::NoMatch => "no_match",
            Self::AnsweringFallback => "answering_fallback",
            Self::Matched => "matched",
            Self::CallingModel => "calling_model",
            Self::Accepted => "accepted",
            Self::OverriddenToFallback => "overridden_to_fallback",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Sampling parameters forwarded to the completion endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

/// Post-generation check that a model answer stays within the supplied context.
///
/// Best effort only: the keyword version both rejects valid paraphrases and accepts
/// answers that share a stray word with the question.
pub trait GroundingCheck: Send + Sync {
    /// `context` is exactly the chunk text the model was shown
    fn is_grounded(&self, query: &Query, context: &str, output: &str) -> bool;
}

/// Accepts the answer when at least one question keyword occurs in the context
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordOverlapCheck;

impl GroundingCheck for KeywordOverlapCheck {
    fn is_grounded(&self, query: &Query, context: &str, _output: &str) -> bool {
        contains_any_keyword(query, context)
    }
}

/// Outcome of one gated question
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub answer: Answer,
    /// Chunks that reached the model (0 when it was never called)
    pub chunks_used: usize,
}

/// Calls the model only when retrieval found support, and vets what comes back
pub struct AnswerGate {
    provider: Arc<dyn CompletionProvider>,
    assembler: PromptAssembler,
    check: Arc<dyn GroundingCheck>,
    sampling: SamplingParams,
}

impl AnswerGate {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        assembler: PromptAssembler,
        sampling: SamplingParams,
    ) -> Self {
        Self {
            provider,
            assembler,
            check: Arc::new(KeywordOverlapCheck),
            sampling,
        }
    }

    /// Replace the grounding heuristic
    pub fn with_check(mut self, check: Arc<dyn GroundingCheck>) -> Self {
        self.check = check;
        self
    }

    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    pub fn sampling(&self) -> SamplingParams {
        self.sampling
    }

    pub(crate) fn transition(query: &Query, from: QueryState, to: QueryState) {
        tracing::debug!(question = %query.text, "query state {} -> {}", from, to);
    }

    /// Answer `query` from the ranked `selected` chunks of `source_filename`
    pub async fn answer(
        &self,
        query: &Query,
        selected: &[ScoredChunk<'_>],
        source_filename: &str,
        course: CourseProfile,
    ) -> Result<GateDecision> {
        let assembled = match self
            .assembler
            .assemble(&query.text, selected, source_filename, course)
        {
            Ok(assembled) => assembled,
            Err(Error::NoContext) => {
                Self::transition(query, QueryState::Scoring, QueryState::NoMatch);
                Self::transition(query, QueryState::NoMatch, QueryState::AnsweringFallback);
                return Ok(GateDecision {
                    answer: Answer::fallback(AnswerStatus::Fallback),
                    chunks_used: 0,
                });
            }
            Err(e) => return Err(e),
        };

        Self::transition(query, QueryState::Scoring, QueryState::Matched);
        if assembled.truncated {
            tracing::debug!(
                "Context truncated to {} chars ({} of {} chunks)",
                self.assembler.context_budget(),
                assembled.chunks_used,
                selected.len()
            );
        }

        let request = CompletionRequest {
            model: self.provider.model().to_string(),
            messages: vec![ChatMessage::user(assembled.prompt)],
            temperature: self.sampling.temperature,
            max_tokens: self.sampling.max_tokens,
        };

        Self::transition(query, QueryState::Matched, QueryState::CallingModel);
        let output = match self.provider.complete(&request).await {
            Ok(output) => output,
            Err(e) => {
                Self::transition(query, QueryState::CallingModel, QueryState::Failed);
                tracing::warn!(
                    transient = e.is_transient(),
                    "{} completion failed: {}",
                    self.provider.name(),
                    e
                );
                return Err(e);
            }
        };
        let output = output.trim();

        if !self.check.is_grounded(query, &assembled.context, output) {
            Self::transition(query, QueryState::CallingModel, QueryState::OverriddenToFallback);
            tracing::info!("Model answer overridden: no question keyword in the supplied context");
            return Ok(GateDecision {
                answer: Answer::fallback(AnswerStatus::Overridden),
                chunks_used: assembled.chunks_used,
            });
        }

        Self::transition(query, QueryState::CallingModel, QueryState::Accepted);
        Ok(GateDecision {
            answer: Answer::accepted(output, source_filename),
            chunks_used: assembled.chunks_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::FALLBACK_ANSWER;
    use crate::providers::MockCompletionProvider;
    use crate::retrieval::KeywordScorer;
    use crate::types::Chunk;

    fn gate(provider: MockCompletionProvider) -> AnswerGate {
        AnswerGate::new(
            Arc::new(provider),
            PromptAssembler::new(4000),
            SamplingParams::default(),
        )
    }

    fn mock_with_model() -> MockCompletionProvider {
        let mut mock = MockCompletionProvider::new();
        mock.expect_model().return_const("test-model".to_string());
        mock.expect_name().return_const("mock".to_string());
        mock
    }

    fn refund_chunk() -> ScoredChunk<'static> {
        ScoredChunk {
            chunk: Chunk {
                index: 0,
                start: 0,
                text: "The refund deadline is March 3. Late submissions are not accepted.",
            },
            score: 2,
        }
    }

    #[tokio::test]
    async fn test_no_match_never_calls_model() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().times(0);
        let query = KeywordScorer::default().parse_query("What is the weather today?");

        let decision = gate(mock)
            .answer(&query, &[], "policy.txt", CourseProfile::General)
            .await
            .unwrap();

        assert_eq!(decision.answer.text, FALLBACK_ANSWER);
        assert_eq!(decision.answer.status, AnswerStatus::Fallback);
        assert_eq!(decision.chunks_used, 0);
    }

    #[tokio::test]
    async fn test_matched_question_calls_model_with_chunk() {
        let mut mock = mock_with_model();
        mock.expect_complete()
            .times(1)
            .withf(|req| {
                req.model == "test-model"
                    && req.messages.len() == 1
                    && req.messages[0].content.contains("The refund deadline is March 3.")
            })
            .returning(|_| Ok("  The deadline is March 3.  ".to_string()));
        let query = KeywordScorer::default().parse_query("When is the refund deadline?");

        let decision = gate(mock)
            .answer(&query, &[refund_chunk()], "policy.txt", CourseProfile::General)
            .await
            .unwrap();

        assert_eq!(decision.answer.status, AnswerStatus::Accepted);
        assert_eq!(decision.answer.text, "The deadline is March 3.");
        assert_eq!(decision.answer.source.as_deref(), Some("policy.txt"));
        assert_eq!(decision.chunks_used, 1);
    }

    #[tokio::test]
    async fn test_ungrounded_output_overridden() {
        let mut mock = mock_with_model();
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok("It will be sunny.".to_string()));
        // Hand-built selection whose text shares no keyword with the question.
        let query = KeywordScorer::default().parse_query("weather forecast");

        let decision = gate(mock)
            .answer(&query, &[refund_chunk()], "policy.txt", CourseProfile::General)
            .await
            .unwrap();

        assert_eq!(decision.answer.status, AnswerStatus::Overridden);
        assert_eq!(decision.answer.text, FALLBACK_ANSWER);
        assert!(decision.answer.source.is_none());
    }

    #[tokio::test]
    async fn test_keyword_cut_by_budget_is_overridden() {
        use crate::ingestion::TextChunker;

        let text = "Submissions go through the course portal before the refund deadline.";
        let scorer = KeywordScorer::default();
        let query = scorer.parse_query("When is the refund deadline?");
        let selected = scorer.rank(&query, TextChunker::new(1200, 0).chunks(text));
        assert_eq!(selected.len(), 1);
        assert!(selected[0].score > 0);

        let mut mock = mock_with_model();
        mock.expect_complete()
            .times(1)
            .withf(|req| {
                let prompt = &req.messages[0].content;
                prompt.contains("Submissions go throu") && !prompt.contains("portal before")
            })
            .returning(|_| Ok("The refund deadline is in the portal.".to_string()));

        let gate = AnswerGate::new(
            Arc::new(mock),
            PromptAssembler::new(20),
            SamplingParams::default(),
        );
        let decision = gate
            .answer(&query, &selected, "policy.txt", CourseProfile::General)
            .await
            .unwrap();

        assert_eq!(decision.answer.status, AnswerStatus::Overridden);
        assert_eq!(decision.answer.text, FALLBACK_ANSWER);
        assert!(decision.answer.source.is_none());
        assert_eq!(decision.chunks_used, 1);
    }

    #[tokio::test]
    async fn test_failure_surfaces_without_retry() {
        let mut mock = mock_with_model();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(Error::auth("HTTP 401")));
        let query = KeywordScorer::default().parse_query("refund deadline");

        let err = gate(mock)
            .answer(&query, &[refund_chunk()], "policy.txt", CourseProfile::General)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_custom_grounding_check() {
        struct RejectAll;
        impl GroundingCheck for RejectAll {
            fn is_grounded(&self, _: &Query, _: &str, _: &str) -> bool {
                false
            }
        }

        let mut mock = mock_with_model();
        mock.expect_complete()
            .returning(|_| Ok("March 3".to_string()));
        let query = KeywordScorer::default().parse_query("refund deadline");

        let decision = gate(mock)
            .with_check(Arc::new(RejectAll))
            .answer(&query, &[refund_chunk()], "policy.txt", CourseProfile::General)
            .await
            .unwrap();

        assert_eq!(decision.answer.status, AnswerStatus::Overridden);
    }

    #[test]
    fn test_terminal_states() {
        assert!(QueryState::Accepted.is_terminal());
        assert!(QueryState::Failed.is_terminal());
        assert!(!QueryState::CallingModel.is_terminal());
        assert_eq!(QueryState::OverriddenToFallback.to_string(), "overridden_to_fallback");
    }
}
