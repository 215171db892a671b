//! Client for OpenAI-style `/chat/completions` endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{CompletionProvider, CompletionRequest, ProviderKind};
use crate::error::{Error, Result};
use crate::types::ChatMessage;

/// HTTP chat-completion client shared by Poe, OpenAI, Together, ZhipuAI and Ollama
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    kind: ProviderKind,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(serde::Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    /// Sent as `null` when unset, which leaves the limit to the endpoint
    max_tokens: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(serde::Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(serde::Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatClient {
    /// Create a new client; `endpoint` is the full chat-completions URL
    pub fn new(
        kind: ProviderKind,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            kind,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::request(format!(
                "{} request timed out after {}s",
                self.kind,
                self.timeout.as_secs()
            ))
        } else {
            Error::request(format!("{} request failed: {}", self.kind, e))
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if let (Some(key_name), None) = (self.kind.secret_key(), &self.api_key) {
            return Err(Error::auth(format!("{} not configured", key_name)));
        }

        let body = ChatCompletionBody {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!(
            "POST {} (model: {}, {} messages)",
            self.endpoint,
            request.model,
            request.messages.len()
        );

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::auth(format!(
                    "{} rejected the credential (HTTP {}): {}",
                    self.kind,
                    status.as_u16(),
                    body
                )),
                _ => Error::provider(status.as_u16(), body),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(status.as_u16(), format!("malformed response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::provider(status.as_u16(), "response contained no choices"))
    }

    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.0,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_auth_error_without_network() {
        // Unroutable endpoint: the call must fail before any connection attempt.
        let client = OpenAiCompatClient::new(
            ProviderKind::Poe,
            "http://127.0.0.1:9/v1/chat/completions",
            "gpt-4o-mini",
            None,
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.complete(&request()).await.unwrap_err();
        match err {
            Error::Auth(message) => assert_eq!(message, "POE_API_KEY not configured"),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_body_always_carries_max_tokens() {
        let req = request();
        let body = ChatCompletionBody {
            model: &req.model,
            messages: &req.messages,
            temperature: req.temperature,
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["max_tokens"].is_null());
        assert!(json.as_object().unwrap().contains_key("max_tokens"));
        assert_eq!(json["messages"][0]["role"], "user");

        let body = ChatCompletionBody {
            max_tokens: Some(200),
            ..body
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["temperature"], 0.0);
    }
}
