//! Offline provider with canned keyword replies

use async_trait::async_trait;

use super::{CompletionProvider, CompletionRequest};
use crate::error::Result;
use crate::types::Role;

/// Replies to greetings and farewells, with a help line for everything else.
/// Needs no network or credential.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedProvider;

impl RuleBasedProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn reply(input: &str) -> &'static str {
        let input = input.to_lowercase();
        if input.contains("hello") {
            "Hi there! 👋"
        } else if input.contains("how are you") {
            "I'm doing great, thanks!"
        } else if input.contains("bye") {
            "Goodbye! Have a nice day 😊"
        } else {
            "I'm just a simple bot. Ask me something like 'hello', 'how are you', or 'bye'."
        }
    }
}

#[async_trait]
impl CompletionProvider for RuleBasedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");
        Ok(Self::reply(last_user).to_string())
    }

    fn name(&self) -> &str {
        "rule_based"
    }

    fn model(&self) -> &str {
        "rule-based"
    }
}
