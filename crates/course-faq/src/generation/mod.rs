//! Prompt assembly and the answer gate

pub mod gate;
pub mod prompt;

pub use gate::{
    AnswerGate, GateDecision, GroundingCheck, KeywordOverlapCheck, QueryState, SamplingParams,
};
pub use prompt::{
    likely_arabic, AssembledPrompt, CourseProfile, PromptAssembler, CHUNK_SEPARATOR,
    FALLBACK_ANSWER,
};
