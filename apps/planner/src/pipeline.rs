//! Inbound facade consumed by the request-handling collaborator.
//!
//! The request path is synchronous only through admission and row
//! creation; generation itself happens on the worker pool. Callers map
//! [`RequestError`] and `PlanStatus` to their own transport representation.
//! Checking that preferences exist, where required, is the collaborator's
//! job before calling in here.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::RequestError;
use crate::generation::service::GenerationService;
use crate::jobs::worker::{spawn_workers, JobContext};
use crate::jobs::{JobQueue, PlanJob};
use crate::limiter::{RateLimits, SlidingWindowLimiter};
use crate::llm_client::ChatApi;
use crate::models::plan::GeneratedPlan;
use crate::models::request::GenerationOptions;
use crate::store::{ContextSource, PlanStore};

/// In-flight jobs the queue buffers before `enqueue` applies backpressure.
const QUEUE_CAPACITY: usize = 64;

/// Wires the whole pipeline from configuration: limiter, generation
/// service, queue, and worker pool. Returns the facade plus the worker
/// handles so an embedder can await drain-down on shutdown.
pub fn build_pipeline(
    config: &Config,
    store: Arc<dyn PlanStore>,
    source: Arc<dyn ContextSource>,
    client: Arc<dyn ChatApi>,
) -> (PlanPipeline, Vec<JoinHandle<()>>) {
    let generator = Arc::new(GenerationService::new(client, config));
    let (queue, rx) = JobQueue::bounded(QUEUE_CAPACITY);
    let handles = spawn_workers(
        config.worker_count,
        rx,
        JobContext {
            store: Arc::clone(&store),
            source,
            generator,
            deadline: config.job_deadline,
        },
    );
    let limiter = SlidingWindowLimiter::new(RateLimits {
        hourly: config.hourly_limit,
        daily: config.daily_limit,
    });
    (PlanPipeline::new(limiter, store, queue), handles)
}

pub struct PlanPipeline {
    limiter: SlidingWindowLimiter,
    store: Arc<dyn PlanStore>,
    queue: JobQueue,
}

impl PlanPipeline {
    pub fn new(limiter: SlidingWindowLimiter, store: Arc<dyn PlanStore>, queue: JobQueue) -> Self {
        Self {
            limiter,
            store,
            queue,
        }
    }

    /// Admits or denies a generation request. On admission a pending
    /// `GeneratedPlan` row exists and a job is scheduled; on denial neither
    /// happens. The limiter is always consulted first.
    pub async fn request_generation(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        options: GenerationOptions,
    ) -> Result<GeneratedPlan, RequestError> {
        self.limiter.check_and_increment(user_id)?;

        let plan = GeneratedPlan::new(trip_id);
        self.store.insert(plan.clone()).await?;

        let job = PlanJob {
            generated_plan_id: plan.id,
            user_id,
            options,
        };
        if let Err(e) = self.queue.enqueue(job).await {
            // The row exists but no job will ever run it; fail it rather
            // than leave it pending forever.
            warn!(plan_id = %plan.id, "job queue unavailable, failing the plan");
            let mut failed = plan;
            failed.fail().map_err(anyhow::Error::from)?;
            self.store.update(&failed).await?;
            return Err(e);
        }

        info!(plan_id = %plan.id, %trip_id, %user_id, "generation request accepted");
        Ok(plan)
    }

    pub async fn get_generated_plan(&self, id: Uuid) -> Result<GeneratedPlan, RequestError> {
        self.store
            .get(id)
            .await?
            .ok_or(RequestError::PlanNotFound(id))
    }

    /// Rates a completed plan. Rejected when the plan is not completed or
    /// the rating falls outside 1-10; the guard lives on the model.
    pub async fn rate_generated_plan(
        &self,
        id: Uuid,
        rating: u8,
    ) -> Result<GeneratedPlan, RequestError> {
        let mut plan = self.get_generated_plan(id).await?;
        plan.apply_rating(rating)
            .map_err(|e| RequestError::RatingRejected(e.to_string()))?;
        self.store.update(&plan).await?;
        Ok(plan)
    }
}
