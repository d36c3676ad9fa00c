//! Request quota shared between traversals.
//!
//! A remote that enforces one quota across all calls from a process needs
//! one piece of state that every traversal consults. [`RequestQuota`] is that
//! state, created by the caller and injected into engines: hand the same
//! `Arc<RequestQuota>` to several engines to make them share the quota, or
//! give each its own to isolate them.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::time::Instant;
use tracing::debug;

/// Longest pause a single rate-limit hint can impose on the quota.
pub const MAX_PAUSE: Duration = Duration::from_secs(24 * 60 * 60);

/// Bound on in-flight remote calls plus a shared "back off until" deadline.
#[derive(Debug)]
pub struct RequestQuota {
    permits: Semaphore,
    max_in_flight: usize,
    paused_until: Mutex<Option<Instant>>,
}

impl RequestQuota {
    /// Allow at most `max_in_flight` concurrent remote calls (at least one).
    pub fn new(max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            permits: Semaphore::new(max_in_flight),
            max_in_flight,
            paused_until: Mutex::new(None),
        }
    }

    /// Hold every caller back for `delay` from now.
    ///
    /// An earlier deadline never shortens a later one already in place.
    /// Delays beyond [`MAX_PAUSE`] are clamped to it.
    pub fn pause_for(&self, delay: Duration) {
        let delay = delay.min(MAX_PAUSE);
        let Some(deadline) = Instant::now().checked_add(delay) else {
            return;
        };
        let mut paused = self.paused_until.lock().expect("lock poisoned");
        if paused.map_or(true, |current| current < deadline) {
            debug!(delay_ms = delay.as_millis() as u64, "request quota paused");
            *paused = Some(deadline);
        }
    }

    /// Deadline of the current pause, if one is still pending.
    pub fn paused_until(&self) -> Option<Instant> {
        let paused = *self.paused_until.lock().expect("lock poisoned");
        paused.filter(|deadline| *deadline > Instant::now())
    }

    /// Wait out any pause, then take one call slot.
    pub async fn acquire(&self) -> SemaphorePermit<'_> {
        while let Some(deadline) = self.paused_until() {
            tokio::time::sleep_until(deadline).await;
        }
        self.permits
            .acquire()
            .await
            .expect("quota semaphore is never closed")
    }

    /// Call slots currently free.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}
