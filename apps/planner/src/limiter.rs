//! Per-user sliding-window admission control.
//!
//! Two windows run concurrently per user: a rolling hour and a rolling
//! day. Check and increment happen under one lock, so concurrent requests
//! for the same user cannot over-admit.
//!
//! Timestamps use `tokio::time::Instant`, which lets the paused test clock
//! drive window rolls.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use uuid::Uuid;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    Hourly,
    Daily,
}

/// Denial: the caller's quota is spent until the window rolls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{scope:?} generation limit reached, next slot in {retry_after:?}")]
pub struct LimitExceeded {
    pub scope: LimitScope,
    pub retry_after: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub hourly: u32,
    pub daily: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            hourly: 5,
            daily: 50,
        }
    }
}

pub struct SlidingWindowLimiter {
    limits: RateLimits,
    /// Admission timestamps per user, oldest first, pruned past the day window.
    windows: Mutex<HashMap<Uuid, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admits the request and records it, or denies without recording.
    /// Must be called before any `GeneratedPlan` row is created.
    pub fn check_and_increment(&self, user_id: Uuid) -> Result<(), LimitExceeded> {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("limiter mutex poisoned");
        let window = windows.entry(user_id).or_default();

        while let Some(&oldest) = window.front() {
            if now.duration_since(oldest) >= DAY {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() as u32 >= self.limits.daily {
            // A zero daily limit denies with a full-window wait.
            let retry_after = window
                .front()
                .map(|oldest| DAY - now.duration_since(*oldest))
                .unwrap_or(DAY);
            return Err(LimitExceeded {
                scope: LimitScope::Daily,
                retry_after,
            });
        }

        let in_hour: Vec<Instant> = window
            .iter()
            .copied()
            .filter(|t| now.duration_since(*t) < HOUR)
            .collect();
        if in_hour.len() as u32 >= self.limits.hourly {
            let oldest = in_hour[0];
            return Err(LimitExceeded {
                scope: LimitScope::Hourly,
                retry_after: HOUR - now.duration_since(oldest),
            });
        }

        window.push_back(now);
        Ok(())
    }
}
