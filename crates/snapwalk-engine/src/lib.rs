//! Traversal engine for snapwalk.
//!
//! Materializes the tree of a remote repository at one revision into a
//! [`Snapshot`] by issuing one shallow remote call per distinct object.
//! The engine schedules calls under a concurrency bound, deduplicates
//! content ids, retries rate-limited and transient failures with backoff,
//! isolates per-node failures from unrelated branches, and honours an
//! external cancellation signal.
//!
//! # Entry Points
//!
//! - [`traverse_repository`] -- one-shot walk of `owner/repo` at a revision
//! - [`TraversalEngine`] -- reusable engine with explicit configuration and
//!   an optional shared [`RequestQuota`]
//!
//! # Result
//!
//! Every walk returns a [`TraversalOutcome`]: the (possibly partial)
//! snapshot, the per-path failures, and a [`TraversalStatus`] telling a
//! drained frontier apart from a cancelled or root-failed run.

pub mod config;
pub mod engine;
pub mod error;
pub mod fanout;
pub mod quota;
pub mod retry;
pub mod snapshot;
pub mod tree;
pub mod visited;

pub use config::TraversalConfig;
pub use engine::{
    traverse_repository, TraversalEngine, TraversalOutcome, TraversalStats, TraversalStatus,
};
pub use error::{EngineError, EngineResult, NodeError, NodeFailure};
pub use quota::RequestQuota;
pub use retry::RetryPolicy;
pub use snapshot::{Snapshot, SnapshotAssembler};
pub use tree::SnapshotTree;
pub use visited::{VisitKey, VisitedSet};

// Re-export key types
pub use snapwalk_resolver::{InMemoryResolver, ObjectResolver, ResolveError};
pub use snapwalk_types::{ContentId, DirEntry, ObjectRef, RepoCoordinates, ResolvedObject, TreePath};
pub use tokio_util::sync::CancellationToken;
