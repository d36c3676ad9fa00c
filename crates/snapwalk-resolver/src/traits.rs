use std::sync::Arc;

use async_trait::async_trait;
use snapwalk_types::{ContentId, ObjectRef, RepoCoordinates, ResolvedObject};

use crate::error::ResolveResult;

/// Adapter over the remote object-graph interface.
///
/// Implementations must satisfy these invariants:
/// - One call returns one level of the tree: a leaf, a full directory
///   listing in remote order, or [`ResolvedObject::Unrecognized`].
/// - Calls are idempotent for unchanged remote state.
/// - Failures are classified into [`ResolveError`](crate::ResolveError)
///   variants; retrying is left to the caller.
#[async_trait]
pub trait ObjectResolver: Send + Sync {
    /// Resolve the object a revision expression (e.g. `main:docs`) points at.
    async fn resolve_by_revision(
        &self,
        repo: &RepoCoordinates,
        revision: &str,
    ) -> ResolveResult<ResolvedObject>;

    /// Resolve an object by its content id.
    async fn resolve_by_identifier(
        &self,
        repo: &RepoCoordinates,
        id: &ContentId,
    ) -> ResolveResult<ResolvedObject>;

    /// Dispatch on the reference kind.
    async fn resolve(&self, reference: &ObjectRef) -> ResolveResult<ResolvedObject> {
        match reference {
            ObjectRef::ByRevision { repo, revision } => {
                self.resolve_by_revision(repo, revision).await
            }
            ObjectRef::ByIdentifier { repo, id } => self.resolve_by_identifier(repo, id).await,
        }
    }
}

#[async_trait]
impl<T: ObjectResolver + ?Sized> ObjectResolver for Arc<T> {
    async fn resolve_by_revision(
        &self,
        repo: &RepoCoordinates,
        revision: &str,
    ) -> ResolveResult<ResolvedObject> {
        (**self).resolve_by_revision(repo, revision).await
    }

    async fn resolve_by_identifier(
        &self,
        repo: &RepoCoordinates,
        id: &ContentId,
    ) -> ResolveResult<ResolvedObject> {
        (**self).resolve_by_identifier(repo, id).await
    }
}
