//! Chat-completion collaborator client.
//!
//! One client serves every call site (exit guard, roast generator, study
//! assistant); each site supplies its own messages and sampling parameters
//! and pairs the call with a local fallback through [`with_fallback`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://api.cerebras.ai/v1";
pub const DEFAULT_MODEL: &str = "llama-4-scout-17b-16e-instruct";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Per-call-site sampling parameters.
#[derive(Debug, Clone, Copy)]
pub struct ChatParams {
    pub max_completion_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
    max_completion_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Thin reqwest wrapper over the hosted chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key(),
        }
    }

    /// Send one chat-completion request and return `choices[0].message.content`.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        params: ChatParams,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            messages,
            model: &self.model,
            max_completion_tokens: params.max_completion_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stream: false,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let payload: ChatResponse = response.json().await?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(content)
    }
}

/// Resolve a collaborator result to a locally computed value on any failure.
/// Callers never special-case network vs. parse errors; the fallback covers
/// both, and the failure is logged rather than surfaced.
pub fn with_fallback<T>(remote: Result<T, LlmError>, fallback: impl FnOnce() -> T) -> T {
    match remote {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "chat collaborator failed, using local fallback");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_fallback_passes_success_through() {
        let value: Result<i32, LlmError> = Ok(7);
        assert_eq!(with_fallback(value, || 0), 7);
    }

    #[test]
    fn with_fallback_recovers_any_error() {
        let value: Result<i32, LlmError> = Err(LlmError::EmptyContent);
        assert_eq!(with_fallback(value, || 42), 42);
    }

    #[test]
    fn response_without_content_deserializes() {
        let payload: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{}}]}"#).unwrap();
        assert!(payload.choices[0].message.content.is_none());
    }
}
