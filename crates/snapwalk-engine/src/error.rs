use snapwalk_resolver::ResolveError;
use snapwalk_types::{ContentId, TreePath, TypeError};
use thiserror::Error;

/// Why a single node of the tree could not be materialized.
///
/// Node errors are terminal for their path only; they never abort siblings
/// or unrelated branches.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("object not found")]
    NotFound,

    #[error("fatal remote failure: {0}")]
    Fatal(String),

    #[error("unrecognized object shape: {0}")]
    UnknownShape(String),

    #[error("binary content is not supported")]
    BinaryContent,

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("directory {id} lists one of its own ancestors")]
    Cycle { id: ContentId },
}

impl NodeError {
    /// Classify a resolver error that will not be retried again.
    pub fn from_resolve(err: ResolveError, attempts: u32) -> Self {
        match err {
            ResolveError::NotFound => Self::NotFound,
            ResolveError::Fatal(cause) => Self::Fatal(cause),
            ResolveError::BinaryContent => Self::BinaryContent,
            retryable @ (ResolveError::RateLimited { .. } | ResolveError::Transient(_)) => {
                Self::RetriesExhausted {
                    attempts,
                    last: retryable.to_string(),
                }
            }
        }
    }
}

/// A node error bound to the path it happened at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeFailure {
    pub path: TreePath,
    /// Content id of the node, `None` for a root addressed by revision.
    pub id: Option<ContentId>,
    pub error: NodeError,
}

/// Errors that prevent a traversal from starting at all.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn terminal_errors_map_one_to_one() {
        assert_eq!(NodeError::from_resolve(ResolveError::NotFound, 1), NodeError::NotFound);
        assert_eq!(
            NodeError::from_resolve(ResolveError::Fatal("denied".into()), 1),
            NodeError::Fatal("denied".into())
        );
        assert_eq!(
            NodeError::from_resolve(ResolveError::BinaryContent, 1),
            NodeError::BinaryContent
        );
    }

    #[test]
    fn retryable_errors_become_exhaustion() {
        let err = NodeError::from_resolve(
            ResolveError::RateLimited {
                retry_after: Some(Duration::from_millis(10)),
            },
            4,
        );
        assert_eq!(
            err,
            NodeError::RetriesExhausted {
                attempts: 4,
                last: "rate limited (retry after 10ms)".into(),
            }
        );
        assert_eq!(err.to_string(), "gave up after 4 attempts: rate limited (retry after 10ms)");
    }

    #[test]
    fn type_errors_convert() {
        let err: EngineError = TypeError::EmptyRevision.into();
        assert!(matches!(err, EngineError::Type(TypeError::EmptyRevision)));
    }
}
