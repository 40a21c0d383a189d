use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::limiter::LimitExceeded;

/// Typed failures from the LLM provider API.
///
/// Classification drives the retry loop in `llm_client`: only retryable
/// variants are re-attempted, and a 429 may carry an advertised delay.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401/403 — the key is wrong, retrying cannot help.
    #[error("authentication rejected: {message}")]
    Authentication { message: String },

    /// Any other 4xx — the request itself is malformed.
    #[error("request rejected (status {status}): {message}")]
    BadRequest { status: u16, message: String },

    /// 429 — retryable after the advertised delay, if given.
    #[error("provider rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// 5xx — transient provider trouble.
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Connection-level failure before any HTTP status was received.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected envelope or schema.
    /// Non-retryable: signals a prompt/schema mismatch needing investigation.
    #[error("malformed response: {0}")]
    ResponseFormat(String),
}

impl ApiError {
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited { .. }
                | ApiError::Server { .. }
                | ApiError::Timeout { .. }
                | ApiError::Network(_)
        )
    }

    /// Advertised delay for a 429, when the provider sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Maps a non-success HTTP status to its error variant.
    pub(crate) fn from_status(status: u16, retry_after: Option<Duration>, message: String) -> Self {
        match status {
            401 | 403 => ApiError::Authentication { message },
            429 => ApiError::RateLimited { retry_after },
            s if s >= 500 => ApiError::Server { status, message },
            _ => ApiError::BadRequest { status, message },
        }
    }
}

/// Failure category carried by a [`GenerationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// The API client exhausted its retries or hit a fatal provider error.
    Api,
    /// The model's output could not be parsed into the plan shape.
    ResponseFormat,
    /// The parsed plan violated an itinerary invariant.
    BusinessValidation,
    /// The generation request failed validation before any API call.
    InvalidRequest,
}

/// Tagged failure returned by the generation service.
///
/// The service never panics for expected failure modes; everything the
/// orchestrator needs to persist an outcome is here.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GenerationError {
    kind: GenerationErrorKind,
    message: String,
    retryable: bool,
}

impl GenerationError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn response_format(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::ResponseFormat,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn business_validation(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::BusinessValidation,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn kind(&self) -> GenerationErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn retryable(&self) -> bool {
        self.retryable
    }
}

impl From<ApiError> for GenerationError {
    fn from(err: ApiError) -> Self {
        let kind = match err {
            ApiError::ResponseFormat(_) => GenerationErrorKind::ResponseFormat,
            _ => GenerationErrorKind::Api,
        };
        Self {
            kind,
            retryable: err.retryable(),
            message: err.to_string(),
        }
    }
}

/// Errors surfaced by the inbound pipeline facade.
///
/// `PreferencesMissing` is a collaborator precondition checked before this
/// core is invoked, so it has no variant here.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(#[from] LimitExceeded),

    #[error("generated plan {0} not found")]
    PlanNotFound(Uuid),

    #[error("rating rejected: {0}")]
    RatingRejected(String),

    #[error("job queue is closed")]
    QueueClosed,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
