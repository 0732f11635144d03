//! Synthetic scoring progress.
//!
//! The underlying LLM call is a single opaque network request with no
//! intermediate progress events, so the value produced here is COSMETIC
//! ONLY: a monotonically-increasing sequence that keeps the indicator
//! visibly alive. It must never be treated as authoritative.
//!
//! Sequence contract: starts at a small non-zero value, increases in bounded
//! increments per tick, faster below the midpoint and slower above it, and
//! never reaches 100 until the real request resolves — at which point it is
//! forced to 100 and cleared after a short delay.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

/// First displayed value — non-zero so the indicator is alive immediately.
pub const START_VALUE: u8 = 7;
/// Ceiling while the request is still in flight.
pub const IN_FLIGHT_CAP: u8 = 95;
/// Per-tick increment below / at-or-above the midpoint.
const FAST_STEP: u8 = 9;
const SLOW_STEP: u8 = 3;
const MIDPOINT: u8 = 50;

/// Tick interval for the background updater.
pub const TICK: Duration = Duration::from_millis(400);
/// How long a finished run stays at 100 before resetting to 0.
pub const RESET_DELAY: Duration = Duration::from_millis(1500);

/// Next value in the synthetic sequence. Pure; monotonic; capped below 100.
pub fn next_value(current: u8) -> u8 {
    let step = if current < MIDPOINT { FAST_STEP } else { SLOW_STEP };
    current.saturating_add(step).min(IN_FLIGHT_CAP)
}

/// Shared per-job progress map. A job with no entry reports 0.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<Mutex<HashMap<Uuid, u8>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for a job; 0 when no run is tracked.
    pub fn get(&self, job_id: Uuid) -> u8 {
        self.lock().get(&job_id).copied().unwrap_or(0)
    }

    /// Seeds the start value and spawns the ticker task for one run.
    /// The ticker stops on its own once the value is forced to 100 (or the
    /// entry is cleared).
    pub fn begin(&self, job_id: Uuid) {
        self.lock().insert(job_id, START_VALUE);

        let tracker = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(TICK).await;
                if !tracker.advance(job_id) {
                    break;
                }
            }
        });
    }

    /// Forces 100 and schedules the reset back to 0 (entry removal) after a
    /// short delay. Called on success AND failure — the indicator always
    /// completes visually.
    pub fn finish(&self, job_id: Uuid) {
        self.lock().insert(job_id, 100);

        let tracker = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(RESET_DELAY).await;
            tracker.lock().remove(&job_id);
            debug!("Progress for job {job_id} reset");
        });
    }

    /// One synthetic tick. Returns false when the run is over (entry gone or
    /// already forced to 100) so the ticker task can stop.
    fn advance(&self, job_id: Uuid) -> bool {
        let mut map = self.lock();
        match map.get_mut(&job_id) {
            Some(value) if *value < 100 => {
                *value = next_value(*value);
                true
            }
            _ => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, u8>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
