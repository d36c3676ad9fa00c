use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::retry::{RetryPolicy, MAX_HINT_DELAY_MS};

/// Configuration for one traversal engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Maximum number of remote resolutions in flight at once.
    pub concurrency_limit: usize,
    /// Backoff applied to rate-limited and transient failures.
    pub retry: RetryPolicy,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 8,
            retry: RetryPolicy::default(),
        }
    }
}

impl TraversalConfig {
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Parse a TOML document; missing keys take their defaults.
    ///
    /// ```toml
    /// concurrency_limit = 4
    ///
    /// [retry]
    /// max_attempts = 5
    /// base_delay_ms = 100
    /// ```
    pub fn from_toml_str(s: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.concurrency_limit == 0 {
            return Err(EngineError::InvalidConfig(
                "concurrency_limit must be positive".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(EngineError::InvalidConfig(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(EngineError::InvalidConfig(format!(
                "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            )));
        }
        if self.retry.max_hint_delay_ms > MAX_HINT_DELAY_MS {
            return Err(EngineError::InvalidConfig(format!(
                "retry.max_hint_delay_ms ({}) exceeds {MAX_HINT_DELAY_MS}",
                self.retry.max_hint_delay_ms
            )));
        }
        Ok(())
    }
}
