//! Storage and collaborator seams.
//!
//! The core is storage-agnostic: plans are persisted behind [`PlanStore`]
//! and trip data arrives as plain values through [`ContextSource`], never
//! fetched from a database here. The in-memory implementations back tests
//! and single-process embeddings.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::plan::GeneratedPlan;
use crate::models::request::{TravelPreferences, TripFacts};

/// Trip facts, ordered note contents, and optional preferences, supplied by
/// the collaborator that owns trip CRUD.
#[derive(Debug, Clone)]
pub struct TripContext {
    pub facts: TripFacts,
    pub notes: Vec<String>,
    pub preferences: Option<TravelPreferences>,
}

#[async_trait]
pub trait ContextSource: Send + Sync {
    /// `None` when the trip no longer exists at job time.
    async fn trip_context(&self, trip_id: Uuid) -> Result<Option<TripContext>>;
}

/// Persistence for `GeneratedPlan` rows. One writer per row: the request
/// path inserts the pending row once, after which only the owning job
/// updates it.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn insert(&self, plan: GeneratedPlan) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<GeneratedPlan>>;
    async fn update(&self, plan: &GeneratedPlan) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryPlanStore {
    plans: Mutex<HashMap<Uuid, GeneratedPlan>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.plans.lock().await.len()
    }

    pub async fn all(&self) -> Vec<GeneratedPlan> {
        self.plans.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn insert(&self, plan: GeneratedPlan) -> Result<()> {
        self.plans.lock().await.insert(plan.id, plan);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<GeneratedPlan>> {
        Ok(self.plans.lock().await.get(&id).cloned())
    }

    async fn update(&self, plan: &GeneratedPlan) -> Result<()> {
        let mut plans = self.plans.lock().await;
        match plans.get_mut(&plan.id) {
            Some(stored) => {
                *stored = plan.clone();
                Ok(())
            }
            None => Err(anyhow!("generated plan {} not found", plan.id)),
        }
    }
}

#[derive(Default)]
pub struct InMemoryContextSource {
    contexts: Mutex<HashMap<Uuid, TripContext>>,
}

impl InMemoryContextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, trip_id: Uuid, context: TripContext) {
        self.contexts.lock().await.insert(trip_id, context);
    }
}

#[async_trait]
impl ContextSource for InMemoryContextSource {
    async fn trip_context(&self, trip_id: Uuid) -> Result<Option<TripContext>> {
        Ok(self.contexts.lock().await.get(&trip_id).cloned())
    }
}
