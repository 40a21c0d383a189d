//! Worker pool and per-job orchestration.
//!
//! Each job drives one `GeneratedPlan` through its lifecycle: mark it
//! generating, then load collaborator data and run the generator under a
//! single hard wall-clock deadline, and persist the terminal state.
//! Every path out of a started job — success, typed failure, deadline,
//! even a panic inside the generator — lands on completed or failed; a
//! plan is never left stuck in generating.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::generation::service::PlanGenerator;
use crate::jobs::PlanJob;
use crate::models::content::PlanContent;
use crate::models::plan::GeneratedPlan;
use crate::models::request::GenerationRequest;
use crate::store::{ContextSource, PlanStore};

/// Everything a worker needs; cheap to clone per task.
#[derive(Clone)]
pub struct JobContext {
    pub store: Arc<dyn PlanStore>,
    pub source: Arc<dyn ContextSource>,
    pub generator: Arc<dyn PlanGenerator>,
    /// Hard wall-clock budget per job; exceeding it fails the plan.
    pub deadline: Duration,
}

/// Spawns `count` workers draining the shared receiver. Workers exit when
/// the queue closes; the returned handles let callers await drain-down.
pub fn spawn_workers(
    count: usize,
    rx: mpsc::Receiver<PlanJob>,
    ctx: JobContext,
) -> Vec<JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));
    (0..count)
        .map(|worker_id| {
            let rx = Arc::clone(&rx);
            let ctx = ctx.clone();
            tokio::spawn(async move {
                loop {
                    let job = { rx.lock().await.recv().await };
                    let Some(job) = job else {
                        debug!(worker_id, "job queue closed, worker exiting");
                        break;
                    };
                    if let Err(e) = run_job(&ctx, &job).await {
                        // Storage trouble, not a generation outcome.
                        error!(
                            plan_id = %job.generated_plan_id,
                            error = %e,
                            "job aborted before reaching a terminal state"
                        );
                    }
                }
            })
        })
        .collect()
}

/// Processes one job to a terminal state. Errors returned here are storage
/// failures only; generation outcomes are always persisted.
pub async fn run_job(ctx: &JobContext, job: &PlanJob) -> Result<()> {
    let Some(mut plan) = ctx.store.get(job.generated_plan_id).await? else {
        // Row deleted (trip cascade) between enqueue and execution.
        debug!(plan_id = %job.generated_plan_id, "no matching plan, nothing to do");
        return Ok(());
    };

    if plan.status.is_terminal() {
        debug!(plan_id = %plan.id, status = ?plan.status, "plan already terminal, skipping");
        return Ok(());
    }

    plan.begin_generating()?;
    ctx.store.update(&plan).await?;

    match generate_bounded(ctx, job, &plan).await {
        Ok(content) => {
            plan.complete(content)?;
            ctx.store.update(&plan).await?;
            info!(plan_id = %plan.id, trip_id = %plan.trip_id, "plan generation completed");
        }
        Err(reason) => {
            // The reason is logged only; the row carries just the status.
            warn!(plan_id = %plan.id, trip_id = %plan.trip_id, %reason, "plan generation failed");
            plan.fail()?;
            ctx.store.update(&plan).await?;
        }
    }

    Ok(())
}

/// Runs the whole job body, context load included, on its own task under
/// the job deadline. The spawn isolates panics: a panicked task reports a
/// join error here instead of tearing down the worker.
async fn generate_bounded(
    ctx: &JobContext,
    job: &PlanJob,
    plan: &GeneratedPlan,
) -> Result<PlanContent, String> {
    let source = Arc::clone(&ctx.source);
    let generator = Arc::clone(&ctx.generator);
    let trip_id = plan.trip_id;
    let options = job.options;

    let mut task = tokio::spawn(async move {
        let context = source
            .trip_context(trip_id)
            .await
            .map_err(|e| format!("trip context load failed: {e}"))?
            .ok_or_else(|| format!("trip {trip_id} no longer exists"))?;

        let request = GenerationRequest {
            facts: context.facts,
            // Absent preferences are not an error here; the collaborator
            // enforces any must-exist precondition before job creation.
            preferences: context.preferences.unwrap_or_default(),
            notes: context.notes,
            options,
        };

        generator.generate(&request).await.map_err(|gen_err| {
            format!(
                "generation failed ({:?}, retryable={}): {}",
                gen_err.kind(),
                gen_err.retryable(),
                gen_err.message()
            )
        })
    });

    match tokio::time::timeout(ctx.deadline, &mut task).await {
        Err(_) => {
            task.abort();
            Err(format!("exceeded the {:?} job deadline", ctx.deadline))
        }
        Ok(Err(join_err)) => Err(format!("generation task panicked: {join_err}")),
        Ok(Ok(result)) => result,
    }
}
