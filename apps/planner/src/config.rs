use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Pipeline configuration loaded from environment variables.
///
/// Passed explicitly to the client and services rather than held in a
/// mutable global, so multiple configurations can coexist in tests.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Per-attempt HTTP timeout for the LLM client.
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub hourly_limit: u32,
    pub daily_limit: u32,
    pub worker_count: usize,
    /// Hard wall-clock budget per generation job.
    pub job_deadline: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_key: require_env("LLM_API_KEY")?,
            api_base_url: std::env::var("LLM_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: std::env::var("PLANNER_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            temperature: env_or("PLANNER_TEMPERATURE", 0.7)?,
            max_tokens: env_or("PLANNER_MAX_TOKENS", 4000)?,
            request_timeout: Duration::from_secs(env_or("LLM_REQUEST_TIMEOUT_SECS", 60)?),
            max_retries: env_or("LLM_MAX_RETRIES", 3)?,
            hourly_limit: env_or("RATE_LIMIT_HOURLY", 5)?,
            daily_limit: env_or("RATE_LIMIT_DAILY", 50)?,
            worker_count: env_or("PLANNER_WORKERS", 4)?,
            job_deadline: Duration::from_secs(env_or("JOB_DEADLINE_SECS", 120)?),
        })
    }
}

// The API key must never reach logs, so Debug redacts it.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("hourly_limit", &self.hourly_limit)
            .field("daily_limit", &self.daily_limit)
            .field("worker_count", &self.worker_count)
            .field("job_deadline", &self.job_deadline)
            .finish()
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        api_key: "sk-test-secret".to_string(),
        api_base_url: "http://localhost:9090/v1".to_string(),
        model: "gpt-4o-mini".to_string(),
        temperature: 0.7,
        max_tokens: 4000,
        request_timeout: Duration::from_secs(60),
        max_retries: 3,
        hourly_limit: 5,
        daily_limit: 50,
        worker_count: 2,
        job_deadline: Duration::from_secs(120),
    }
}
