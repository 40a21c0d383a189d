//! Generation service — turns a validated request into a `PlanContent`.
//!
//! Flow: validate request → build prompts + schema → call the LLM client →
//! parse structured output → business-validate the itinerary.
//!
//! Expected failures never panic and never escape as raw errors; the
//! orchestrator receives a tagged [`GenerationError`] and decides what to
//! persist.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::GenerationError;
use crate::generation::prompts::{build_user_prompt, SYSTEM_PROMPT};
use crate::generation::schema::{plan_content_schema, SCHEMA_NAME};
use crate::generation::validation::{validate_content, validate_request};
use crate::llm_client::{ChatApi, ChatMessage, ChatRequest};
use crate::models::content::PlanContent;
use crate::models::request::GenerationRequest;

/// Seam between the orchestrator and the generation pipeline; the worker
/// tests script this instead of standing up a provider.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<PlanContent, GenerationError>;
}

pub struct GenerationService {
    client: Arc<dyn ChatApi>,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl GenerationService {
    pub fn new(client: Arc<dyn ChatApi>, config: &Config) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl PlanGenerator for GenerationService {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<PlanContent, GenerationError> {
        let problems = validate_request(request);
        if !problems.is_empty() {
            return Err(GenerationError::invalid_request(problems.join("; ")));
        }

        let chat = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_user_prompt(request)),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            schema_name: SCHEMA_NAME.to_string(),
            schema: plan_content_schema(),
        };

        let response = self.client.chat_completion_with_schema(chat).await?;
        let json = response.content_as_json()?;

        let content: PlanContent = serde_json::from_value(json).map_err(|e| {
            GenerationError::response_format(format!(
                "generated plan does not match the expected shape: {e}"
            ))
        })?;

        let violations = validate_content(&content, &request.facts);
        if !violations.is_empty() {
            warn!(
                destination = %request.facts.destination,
                violations = violations.len(),
                "generated plan failed business validation"
            );
            return Err(GenerationError::business_validation(violations.join("; ")));
        }

        info!(
            destination = %request.facts.destination,
            days = content.daily_itinerary.len(),
            total_tokens = response.usage.total_tokens,
            "plan generated"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::errors::{ApiError, GenerationErrorKind};
    use crate::llm_client::{ChatResponse, TokenUsage};
    use crate::models::content::sample_content;
    use crate::models::request::sample_request;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted ChatApi: pops pre-queued outcomes and records requests.
    struct ScriptedChat {
        outcomes: Mutex<Vec<Result<ChatResponse, ApiError>>>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedChat {
        fn returning(outcome: Result<ChatResponse, ApiError>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(vec![outcome]),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn json_response(content: &PlanContent) -> ChatResponse {
            ChatResponse {
                content: serde_json::to_string(content).unwrap(),
                usage: TokenUsage {
                    prompt_tokens: 100,
                    completion_tokens: 900,
                    total_tokens: 1000,
                },
            }
        }
    }

    #[async_trait]
    impl ChatApi for ScriptedChat {
        async fn chat_completion_with_schema(
            &self,
            request: ChatRequest,
        ) -> Result<ChatResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    fn service(chat: Arc<ScriptedChat>) -> GenerationService {
        GenerationService::new(chat, &test_config())
    }

    fn valid_content() -> PlanContent {
        sample_content(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(), 3, 2)
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let chat = ScriptedChat::returning(Ok(ScriptedChat::json_response(&valid_content())));
        let content = service(chat.clone())
            .generate(&sample_request())
            .await
            .unwrap();
        assert_eq!(content, valid_content());

        // The call carried the structured-output contract.
        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gpt-4o-mini");
        assert_eq!(seen[0].schema_name, "travel_plan");
        assert_eq!(seen[0].messages[0].role, "system");
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_any_api_call() {
        let chat = ScriptedChat::returning(Ok(ScriptedChat::json_response(&valid_content())));
        let mut request = sample_request();
        request.facts.destination = String::new();

        let err = service(chat.clone()).generate(&request).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::InvalidRequest);
        assert!(!err.retryable());
        assert!(chat.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_error_maps_to_generation_error() {
        let chat = ScriptedChat::returning(Err(ApiError::Server {
            status: 500,
            message: "exhausted".to_string(),
        }));
        let err = service(chat).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::Api);
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn test_timeout_error_surfaces_as_retryable() {
        let chat = ScriptedChat::returning(Err(ApiError::Timeout {
            after: Duration::from_secs(60),
        }));
        let err = service(chat).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::Api);
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn test_non_json_content_is_format_error() {
        let chat = ScriptedChat::returning(Ok(ChatResponse {
            content: "Here is your itinerary: ...".to_string(),
            usage: TokenUsage::default(),
        }));
        let err = service(chat).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::ResponseFormat);
        assert!(!err.retryable());
    }

    #[tokio::test]
    async fn test_schema_shaped_but_wrong_fields_is_format_error() {
        let chat = ScriptedChat::returning(Ok(ChatResponse {
            content: r#"{"summary": {"total": 1}, "days": []}"#.to_string(),
            usage: TokenUsage::default(),
        }));
        let err = service(chat).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::ResponseFormat);
    }

    #[tokio::test]
    async fn test_inconsistent_itinerary_is_business_validation_error() {
        // Parses fine but covers 2 days for a 3-day trip.
        let short = sample_content(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(), 2, 2);
        let chat = ScriptedChat::returning(Ok(ScriptedChat::json_response(&short)));

        let err = service(chat).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::BusinessValidation);
        assert!(!err.retryable());
    }
}
