//! `GeneratedPlan` — the persisted record tracking one generation attempt.
//!
//! The status lifecycle is forward-only: pending → generating →
//! {completed, failed}. All mutation goes through the guarded methods
//! here; stores persist whatever state these methods produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::content::PlanContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

impl PlanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Completed | PlanStatus::Failed)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanStateError {
    #[error("illegal status transition: {from:?} -> {to:?}")]
    IllegalTransition { from: PlanStatus, to: PlanStatus },

    #[error("rating is only settable on a completed plan (status is {status:?})")]
    RatingUnavailable { status: PlanStatus },

    #[error("rating {0} is out of range (must be 1-10)")]
    RatingOutOfRange(u8),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub status: PlanStatus,
    /// Present iff status == Completed.
    pub content: Option<PlanContent>,
    /// 1-10, settable only once the plan is completed.
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GeneratedPlan {
    pub fn new(trip_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            trip_id,
            status: PlanStatus::Pending,
            content: None,
            rating: None,
            created_at: now,
            updated_at: now,
        }
    }

    // Allowed: Pending -> Generating, Generating -> Completed/Failed, and
    // Pending -> Failed for plans whose job could never start. Terminal
    // states never transition again.
    fn transition(&mut self, to: PlanStatus) -> Result<(), PlanStateError> {
        let legal = matches!(
            (self.status, to),
            (PlanStatus::Pending, PlanStatus::Generating)
                | (PlanStatus::Pending, PlanStatus::Failed)
                | (PlanStatus::Generating, PlanStatus::Completed)
                | (PlanStatus::Generating, PlanStatus::Failed)
        );
        if !legal {
            return Err(PlanStateError::IllegalTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn begin_generating(&mut self) -> Result<(), PlanStateError> {
        self.transition(PlanStatus::Generating)
    }

    pub fn complete(&mut self, content: PlanContent) -> Result<(), PlanStateError> {
        self.transition(PlanStatus::Completed)?;
        self.content = Some(content);
        Ok(())
    }

    /// Content stays empty on failure; the reason is logged, never persisted.
    pub fn fail(&mut self) -> Result<(), PlanStateError> {
        self.transition(PlanStatus::Failed)
    }

    /// The single guarded write path for ratings.
    pub fn apply_rating(&mut self, rating: u8) -> Result<(), PlanStateError> {
        if self.status != PlanStatus::Completed {
            return Err(PlanStateError::RatingUnavailable {
                status: self.status,
            });
        }
        if !(1..=10).contains(&rating) {
            return Err(PlanStateError::RatingOutOfRange(rating));
        }
        self.rating = Some(rating);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::sample_content;
    use chrono::NaiveDate;

    fn content() -> PlanContent {
        sample_content(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(), 3, 2)
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut plan = GeneratedPlan::new(Uuid::new_v4());
        assert_eq!(plan.status, PlanStatus::Pending);
        assert!(plan.content.is_none());

        plan.begin_generating().unwrap();
        assert_eq!(plan.status, PlanStatus::Generating);

        plan.complete(content()).unwrap();
        assert_eq!(plan.status, PlanStatus::Completed);
        assert!(plan.content.is_some());
    }

    #[test]
    fn test_failure_path_leaves_content_empty() {
        let mut plan = GeneratedPlan::new(Uuid::new_v4());
        plan.begin_generating().unwrap();
        plan.fail().unwrap();
        assert_eq!(plan.status, PlanStatus::Failed);
        assert!(plan.content.is_none());
    }

    #[test]
    fn test_pending_can_fail_directly() {
        // A plan whose job never started (queue gone) must not stay pending.
        let mut plan = GeneratedPlan::new(Uuid::new_v4());
        assert!(plan.fail().is_ok());
    }

    #[test]
    fn test_pending_cannot_complete_directly() {
        let mut plan = GeneratedPlan::new(Uuid::new_v4());
        assert_eq!(
            plan.complete(content()),
            Err(PlanStateError::IllegalTransition {
                from: PlanStatus::Pending,
                to: PlanStatus::Completed,
            })
        );
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        let mut completed = GeneratedPlan::new(Uuid::new_v4());
        completed.begin_generating().unwrap();
        completed.complete(content()).unwrap();
        assert!(completed.begin_generating().is_err());
        assert!(completed.fail().is_err());

        let mut failed = GeneratedPlan::new(Uuid::new_v4());
        failed.begin_generating().unwrap();
        failed.fail().unwrap();
        assert!(failed.begin_generating().is_err());
        assert!(failed.complete(content()).is_err());
        assert!(failed.fail().is_err());
    }

    #[test]
    fn test_rating_rejected_unless_completed() {
        let mut plan = GeneratedPlan::new(Uuid::new_v4());
        assert_eq!(
            plan.apply_rating(7),
            Err(PlanStateError::RatingUnavailable {
                status: PlanStatus::Pending
            })
        );

        plan.begin_generating().unwrap();
        assert!(plan.apply_rating(7).is_err());

        plan.fail().unwrap();
        assert!(plan.apply_rating(7).is_err());
        assert!(plan.rating.is_none());
    }

    #[test]
    fn test_rating_range_enforced() {
        let mut plan = GeneratedPlan::new(Uuid::new_v4());
        plan.begin_generating().unwrap();
        plan.complete(content()).unwrap();

        assert_eq!(plan.apply_rating(0), Err(PlanStateError::RatingOutOfRange(0)));
        assert_eq!(
            plan.apply_rating(11),
            Err(PlanStateError::RatingOutOfRange(11))
        );

        plan.apply_rating(1).unwrap();
        plan.apply_rating(10).unwrap();
        assert_eq!(plan.rating, Some(10));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(PlanStatus::Generating).unwrap(),
            "generating"
        );
        assert_eq!(serde_json::to_value(PlanStatus::Pending).unwrap(), "pending");
    }
}
