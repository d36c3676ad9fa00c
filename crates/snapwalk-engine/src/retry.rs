use std::time::Duration;

use serde::{Deserialize, Serialize};
use snapwalk_resolver::ObjectResolver;
use snapwalk_types::{ObjectRef, ResolvedObject};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::NodeError;
use crate::quota::RequestQuota;

/// Upper bound accepted for [`RetryPolicy::max_hint_delay_ms`] (one day).
pub const MAX_HINT_DELAY_MS: u64 = 24 * 60 * 60 * 1_000;

/// Bounded exponential backoff for rate-limited and transient failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per node, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles on each further failure.
    pub base_delay_ms: u64,
    /// Cap on computed backoff.
    pub max_delay_ms: u64,
    /// Cap on a `retry-after` hint from the remote.
    pub max_hint_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
            max_hint_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Delay before retrying after failed attempt number `attempt` (1-based).
    ///
    /// A hint from the remote takes precedence over the computed backoff.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        match hint {
            Some(hint) => hint.min(Duration::from_millis(self.max_hint_delay_ms)),
            None => {
                let exponent = attempt.saturating_sub(1).min(31);
                self.base_delay()
                    .saturating_mul(1u32 << exponent)
                    .min(self.max_delay())
            }
        }
    }
}

/// How one node's resolution ended.
#[derive(Debug)]
pub(crate) enum Attempted {
    Resolved(ResolvedObject),
    Failed(NodeError),
    Cancelled,
}

#[derive(Debug)]
pub(crate) struct RetryReport {
    pub outcome: Attempted,
    /// Remote calls actually issued.
    pub calls: u32,
}

/// Resolve `reference`, retrying per `policy`.
///
/// The cancellation signal is checked before every attempt, so no remote
/// call starts once it fires; a call already issued runs to completion.
pub(crate) async fn resolve_with_retry<R: ObjectResolver + ?Sized>(
    resolver: &R,
    reference: &ObjectRef,
    policy: &RetryPolicy,
    quota: Option<&RequestQuota>,
    cancel: &CancellationToken,
) -> RetryReport {
    let max_attempts = policy.max_attempts.max(1);
    let mut calls = 0;

    loop {
        if cancel.is_cancelled() {
            return RetryReport { outcome: Attempted::Cancelled, calls };
        }

        let permit = match quota {
            Some(quota) => tokio::select! {
                permit = quota.acquire() => Some(permit),
                _ = cancel.cancelled() => {
                    return RetryReport { outcome: Attempted::Cancelled, calls };
                }
            },
            None => None,
        };
        if cancel.is_cancelled() {
            return RetryReport { outcome: Attempted::Cancelled, calls };
        }

        calls += 1;
        let result = resolver.resolve(reference).await;
        drop(permit);

        let err = match result {
            Ok(object) => {
                return RetryReport {
                    outcome: Attempted::Resolved(object),
                    calls,
                };
            }
            Err(err) => err,
        };

        if !err.is_retryable() || calls >= max_attempts {
            return RetryReport {
                outcome: Attempted::Failed(NodeError::from_resolve(err, calls)),
                calls,
            };
        }

        let delay = policy.delay_for(calls, err.retry_after());
        if let (Some(quota), Some(hint)) = (quota, err.retry_after()) {
            quota.pause_for(hint.min(delay));
        }
        if err.retry_after().is_some() {
            warn!(?reference, attempt = calls, delay_ms = delay.as_millis() as u64, "rate limited; backing off");
        } else {
            debug!(?reference, attempt = calls, delay_ms = delay.as_millis() as u64, error = %err, "retrying");
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => {
                return RetryReport { outcome: Attempted::Cancelled, calls };
            }
        }
    }
}
