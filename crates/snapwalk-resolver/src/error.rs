use std::time::Duration;

/// Errors from a single remote resolution.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The object (or revision) does not exist on the remote.
    #[error("object not found")]
    NotFound,

    /// The remote rejected the call because of its request quota.
    #[error("rate limited{}", hint_suffix(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// A failure that may go away on its own (timeouts, 5xx, resets).
    #[error("transient failure: {0}")]
    Transient(String),

    /// A failure that will not go away by retrying.
    #[error("fatal failure: {0}")]
    Fatal(String),

    /// The leaf exists but has no textual payload.
    #[error("binary content is not supported")]
    BinaryContent,
}

impl ResolveError {
    /// Whether the engine should retry the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transient(_))
    }

    /// Delay requested by the remote, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

fn hint_suffix(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {}ms)", d.as_millis()),
        None => String::new(),
    }
}

/// Result alias for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
