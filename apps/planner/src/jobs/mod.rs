//! Background generation jobs.
//!
//! A job carries only primitive values — the worker may run in a different
//! context than the request thread that enqueued it, so no live references
//! cross the channel.

pub mod worker;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::errors::RequestError;
use crate::models::request::GenerationOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanJob {
    pub generated_plan_id: Uuid,
    pub user_id: Uuid,
    /// Request-scoped flags; not derivable from the trip at job time.
    pub options: GenerationOptions,
}

/// Fire-and-forget handoff from the request path to the worker pool.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<PlanJob>,
}

impl JobQueue {
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<PlanJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub async fn enqueue(&self, job: PlanJob) -> Result<(), RequestError> {
        self.tx.send(job).await.map_err(|_| RequestError::QueueClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_delivers_payload() {
        let (queue, mut rx) = JobQueue::bounded(4);
        let job = PlanJob {
            generated_plan_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            options: GenerationOptions::default(),
        };
        queue.enqueue(job.clone()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.generated_plan_id, job.generated_plan_id);
        assert_eq!(received.user_id, job.user_id);
    }

    #[tokio::test]
    async fn test_enqueue_after_receiver_dropped_reports_closed() {
        let (queue, rx) = JobQueue::bounded(4);
        drop(rx);
        let job = PlanJob {
            generated_plan_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            options: GenerationOptions::default(),
        };
        assert!(matches!(
            queue.enqueue(job).await,
            Err(RequestError::QueueClosed)
        ));
    }

    #[test]
    fn test_job_payload_is_serializable() {
        // The payload must survive an external queue round-trip.
        let job = PlanJob {
            generated_plan_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            options: GenerationOptions {
                include_budget_breakdown: true,
                include_restaurants: false,
            },
        };
        let json = serde_json::to_string(&job).unwrap();
        let recovered: PlanJob = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered.generated_plan_id, job.generated_plan_id);
        assert!(recovered.options.include_budget_breakdown);
    }
}
