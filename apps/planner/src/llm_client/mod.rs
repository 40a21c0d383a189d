//! LLM client — the single point of entry for provider API calls.
//!
//! ARCHITECTURAL RULE: no other module talks HTTP to the provider. All
//! LLM interactions go through [`OpenAiClient`], which owns the retry
//! loop and the structured-output request shape.
//!
//! The API key lives only inside the client and the `Authorization`
//! header; it is never logged and never appears in error messages.

use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::ApiError;

pub mod retry;

pub use retry::RetrySchedule;

#[derive(Debug, Clone)]
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

/// One structured-output chat-completion call.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub schema_name: String,
    /// JSON Schema the response content must conform to (`strict: true`).
    pub schema: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// A successful chat completion. Failure is carried by the `Result` the
/// client returns, so there is no separate success flag.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Raw contents of `choices[0].message.content` — a JSON document when
    /// the schema constraint held.
    pub content: String,
    pub usage: TokenUsage,
}

impl ChatResponse {
    pub fn content_as_json(&self) -> Result<Value, ApiError> {
        serde_json::from_str(&self.content).map_err(|e| {
            ApiError::ResponseFormat(format!("message content is not valid JSON: {e}"))
        })
    }
}

/// Seam for the generation service; lets tests script provider behavior.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn chat_completion_with_schema(
        &self,
        request: ChatRequest,
    ) -> Result<ChatResponse, ApiError>;
}

/// Chat-completions client for an OpenAI-style provider.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    request_timeout: Duration,
    retry: RetrySchedule,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_timeout: config.request_timeout,
            retry: RetrySchedule::with_max_retries(config.max_retries),
        })
    }

    fn build_request_body(request: &ChatRequest) -> Value {
        json!({
            "model": request.model,
            "messages": request.messages.iter().map(|m| json!({
                "role": m.role,
                "content": m.content,
            })).collect::<Vec<_>>(),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.schema,
                },
            },
        })
    }

    async fn execute_once(&self, url: &str, body: &Value) -> Result<ChatResponse, ApiError> {
        let response = match self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Err(ApiError::Timeout {
                    after: self.request_timeout,
                })
            }
            Err(e) => return Err(ApiError::Network(e.without_url().to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), retry_after, message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.without_url().to_string()))?;
        parse_envelope(&body)
    }
}

#[async_trait]
impl ChatApi for OpenAiClient {
    /// Executes the call with bounded retry: 5xx/timeout/network errors back
    /// off exponentially, a 429 waits its advertised delay, 401 and other
    /// 4xx fail immediately. All retries are contained here; callers see
    /// only the final outcome.
    async fn chat_completion_with_schema(
        &self,
        request: ChatRequest,
    ) -> Result<ChatResponse, ApiError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::build_request_body(&request);

        let mut attempt: u32 = 0;
        loop {
            let error = match self.execute_once(&url, &body).await {
                Ok(response) => {
                    debug!(
                        model = %request.model,
                        total_tokens = response.usage.total_tokens,
                        "chat completion succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => e,
            };

            match self.retry.delay_for(&error, attempt) {
                Some(delay) => {
                    attempt += 1;
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "chat completion attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(error),
            }
        }
    }
}

// Provider response envelope: {choices: [{message: {content}}], usage: {...}}

#[derive(Debug, Deserialize)]
struct Envelope {
    choices: Vec<EnvelopeChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct EnvelopeChoice {
    message: EnvelopeMessage,
}

#[derive(Debug, Deserialize)]
struct EnvelopeMessage {
    content: Option<String>,
}

fn parse_envelope(body: &str) -> Result<ChatResponse, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| ApiError::ResponseFormat(format!("unexpected response envelope: {e}")))?;

    let content = envelope
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ApiError::ResponseFormat("response contained no message content".to_string()))?;

    Ok(ChatResponse {
        content,
        usage: envelope.usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage::system("You plan trips."),
                ChatMessage::user("Plan Lisbon."),
            ],
            temperature: 0.7,
            max_tokens: 4000,
            schema_name: "travel_plan".to_string(),
            schema: json!({"type": "object"}),
        }
    }

    #[test]
    fn test_build_request_body_shape() {
        let body = OpenAiClient::build_request_body(&request());

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "travel_plan");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert!(body["response_format"]["json_schema"]["schema"].is_object());
    }

    #[test]
    fn test_parse_envelope_success() {
        let body = r#"{
            "choices": [{"message": {"content": "{\"summary\": {}}"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 800, "total_tokens": 920}
        }"#;
        let response = parse_envelope(body).unwrap();
        assert_eq!(response.content, r#"{"summary": {}}"#);
        assert_eq!(response.usage.total_tokens, 920);
    }

    #[test]
    fn test_parse_envelope_missing_usage_defaults_to_zero() {
        let body = r#"{"choices": [{"message": {"content": "{}"}}]}"#;
        let response = parse_envelope(body).unwrap();
        assert_eq!(response.usage.total_tokens, 0);
    }

    #[test]
    fn test_parse_envelope_without_choices_is_format_error() {
        let err = parse_envelope(r#"{"choices": [], "usage": {}}"#).unwrap_err();
        assert!(matches!(err, ApiError::ResponseFormat(_)));

        let err = parse_envelope("not json at all").unwrap_err();
        assert!(matches!(err, ApiError::ResponseFormat(_)));
    }

    #[test]
    fn test_content_as_json() {
        let response = ChatResponse {
            content: r#"{"key": "value"}"#.to_string(),
            usage: TokenUsage::default(),
        };
        assert_eq!(response.content_as_json().unwrap()["key"], "value");

        let garbled = ChatResponse {
            content: "I'm sorry, I can't do that".to_string(),
            usage: TokenUsage::default(),
        };
        assert!(matches!(
            garbled.content_as_json(),
            Err(ApiError::ResponseFormat(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let mut config = crate::config::test_config();
        config.api_base_url = "http://localhost:9090/v1/".to_string();
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9090/v1");
    }
}
