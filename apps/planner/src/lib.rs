//! Asynchronous AI travel-plan generation pipeline.
//!
//! The crate covers the generation core only: the LLM chat-completions
//! client with structured output and bounded retry, the prompt/schema-driven
//! generation service, the per-user sliding-window rate limiter, and the
//! background job orchestrator that drives a `GeneratedPlan` through its
//! status lifecycle. Routing, rendering, session auth and trip CRUD are
//! collaborators behind the traits in [`store`].

pub mod config;
pub mod errors;
pub mod generation;
pub mod jobs;
pub mod limiter;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod store;

pub use config::Config;
pub use errors::{ApiError, GenerationError, RequestError};
pub use models::plan::{GeneratedPlan, PlanStatus};
pub use pipeline::PlanPipeline;
