//! The traversal engine.
//!
//! A single coordinator owns the frontier of `(path, reference)` entries
//! still to resolve. It hands entries to at most `concurrency_limit` workers
//! on a [`JoinSet`]; each worker performs one resolution (with retries) and
//! reports back. The coordinator records leaves, expands directories in
//! listing order, and routes already-scheduled ids through the fan-out
//! table, until the frontier is empty and no worker is left in flight.
//!
//! # Invariants
//!
//! - Each content id is resolved at most once per traversal.
//! - A failure is recorded at its own path (and the paths aliasing the same
//!   id) and never aborts another branch.
//! - Only a failed root aborts the traversal as a whole.
//! - After cancellation no remote call is started.

use std::collections::VecDeque;
use std::sync::Arc;

use snapwalk_resolver::ObjectResolver;
use snapwalk_types::{ContentId, ObjectRef, RepoCoordinates, ResolvedObject, RevisionSpec, TreePath};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TraversalConfig;
use crate::error::{EngineResult, NodeError, NodeFailure};
use crate::fanout::{Alias, Attach, FanOutTable, Lineage};
use crate::quota::RequestQuota;
use crate::retry::{resolve_with_retry, Attempted, RetryReport};
use crate::snapshot::{Snapshot, SnapshotAssembler};
use crate::visited::{VisitKey, VisitedSet};

/// How a traversal ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalStatus {
    /// The frontier drained. Per-node failures may still be present.
    Completed,
    /// The cancellation signal fired before the frontier drained.
    Cancelled,
    /// The root could not be resolved; nothing below it was attempted.
    RootFailed,
}

impl std::fmt::Display for TraversalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::RootFailed => write!(f, "root-failed"),
        }
    }
}

/// Counters collected during one traversal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Remote calls issued, root included, retries included.
    pub resolver_calls: u64,
    /// Calls beyond the first attempt of each node.
    pub retries: u64,
    /// Paths served from an id that was already scheduled.
    pub deduplicated_paths: u64,
    /// Highest number of workers in flight at once.
    pub max_in_flight: usize,
    /// Frontier entries and parked paths left unresolved by cancellation.
    pub abandoned: usize,
}

/// Result of one traversal.
#[derive(Clone, Debug)]
pub struct TraversalOutcome {
    pub snapshot: Snapshot,
    /// Per-path failures, sorted by path.
    pub failures: Vec<NodeFailure>,
    pub status: TraversalStatus,
    pub stats: TraversalStats,
}

impl TraversalOutcome {
    /// `true` when the frontier drained (failures may still exist).
    pub fn completed(&self) -> bool {
        self.status == TraversalStatus::Completed
    }

    /// `true` when the frontier drained without a single failure.
    pub fn is_clean(&self) -> bool {
        self.completed() && self.failures.is_empty()
    }

    pub fn was_cancelled(&self) -> bool {
        self.status == TraversalStatus::Cancelled
    }
}

struct FrontierEntry {
    path: TreePath,
    reference: ObjectRef,
    lineage: Arc<Lineage>,
}

struct WorkerReport {
    entry: FrontierEntry,
    report: RetryReport,
}

/// A resolved object to lay out under `path`.
struct Placement {
    path: TreePath,
    id: Option<ContentId>,
    lineage: Arc<Lineage>,
    object: Arc<ResolvedObject>,
}

/// Walks remote trees into snapshots.
///
/// The engine itself is stateless between calls; every [`traverse`] gets
/// its own visited set, fan-out table, and assembler. Only the resolver and
/// the optional [`RequestQuota`] are shared.
///
/// [`traverse`]: TraversalEngine::traverse
pub struct TraversalEngine<R: ?Sized> {
    resolver: Arc<R>,
    config: TraversalConfig,
    quota: Option<Arc<RequestQuota>>,
}

impl<R: ObjectResolver + ?Sized + 'static> TraversalEngine<R> {
    pub fn new(resolver: Arc<R>, config: TraversalConfig) -> Self {
        Self {
            resolver,
            config,
            quota: None,
        }
    }

    /// Route every remote call through `quota`.
    pub fn with_quota(mut self, quota: Arc<RequestQuota>) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Walk `repo` at `revision`.
    pub async fn traverse_revision(
        &self,
        repo: RepoCoordinates,
        revision: &RevisionSpec,
        cancel: CancellationToken,
    ) -> EngineResult<TraversalOutcome> {
        self.traverse(ObjectRef::by_revision(repo, revision.expression()), cancel)
            .await
    }

    /// Walk the tree below `root`.
    ///
    /// Fails only if the configuration is invalid; every remote failure is
    /// reported inside the returned outcome.
    pub async fn traverse(
        &self,
        root: ObjectRef,
        cancel: CancellationToken,
    ) -> EngineResult<TraversalOutcome> {
        self.config.validate()?;
        Ok(Run::new(root).drive(self, cancel).await)
    }
}

/// Mutable state of one traversal.
struct Run {
    root: ObjectRef,
    visited: VisitedSet,
    fanout: FanOutTable,
    assembler: SnapshotAssembler,
    frontier: VecDeque<FrontierEntry>,
    stats: TraversalStats,
    interrupted: bool,
}

impl Run {
    fn new(root: ObjectRef) -> Self {
        Self {
            root,
            visited: VisitedSet::new(),
            fanout: FanOutTable::new(),
            assembler: SnapshotAssembler::new(),
            frontier: VecDeque::new(),
            stats: TraversalStats::default(),
            interrupted: false,
        }
    }

    async fn drive<R: ObjectResolver + ?Sized + 'static>(
        mut self,
        engine: &TraversalEngine<R>,
        cancel: CancellationToken,
    ) -> TraversalOutcome {
        let root = self.root.clone();
        let limit = engine.config.concurrency_limit;
        info!(root = ?root, concurrency_limit = limit, "traversal started");

        let root_id = root.content_id().cloned();
        self.visited
            .mark_if_absent(root_id.clone().map_or(VisitKey::Root, VisitKey::Object));
        if let Some(id) = &root_id {
            self.fanout.register(id.clone());
        }

        let report = resolve_with_retry(
            &*engine.resolver,
            &root,
            &engine.config.retry,
            engine.quota.as_deref(),
            &cancel,
        )
        .await;
        self.count_calls(report.calls);

        let object = match report.outcome {
            Attempted::Cancelled => {
                self.interrupted = true;
                return self.finish(TraversalStatus::Cancelled);
            }
            Attempted::Failed(err) => {
                warn!(error = %err, "root resolution failed");
                self.assembler.record_failure(TreePath::root(), root_id, err);
                return self.finish(TraversalStatus::RootFailed);
            }
            Attempted::Resolved(ResolvedObject::Unrecognized(kind)) => {
                warn!(%kind, "root has an unrecognized shape");
                self.assembler
                    .record_failure(TreePath::root(), root_id, NodeError::UnknownShape(kind));
                return self.finish(TraversalStatus::RootFailed);
            }
            Attempted::Resolved(object) => Arc::new(object),
        };

        if let Some(id) = &root_id {
            self.fanout.resolve(id, Arc::clone(&object));
        }
        self.place(
            Placement {
                path: TreePath::root(),
                lineage: Lineage::root(root_id.clone()),
                id: root_id,
                object,
            },
            true,
        );

        let mut workers: JoinSet<WorkerReport> = JoinSet::new();
        loop {
            while !cancel.is_cancelled() && workers.len() < limit {
                let Some(entry) = self.frontier.pop_front() else {
                    break;
                };
                let resolver = Arc::clone(&engine.resolver);
                let policy = engine.config.retry.clone();
                let quota = engine.quota.clone();
                let cancel = cancel.clone();
                workers.spawn(async move {
                    let report = resolve_with_retry(
                        &*resolver,
                        &entry.reference,
                        &policy,
                        quota.as_deref(),
                        &cancel,
                    )
                    .await;
                    WorkerReport { entry, report }
                });
                self.stats.max_in_flight = self.stats.max_in_flight.max(workers.len());
            }

            let Some(joined) = workers.join_next().await else {
                break;
            };
            match joined {
                Ok(report) => {
                    let expand = !cancel.is_cancelled();
                    self.absorb(report, expand);
                }
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => warn!(error = %err, "worker ended without a report"),
            }
        }

        if !self.frontier.is_empty() {
            self.interrupted = true;
            self.stats.abandoned += self.frontier.len();
        }
        let status = if self.interrupted {
            TraversalStatus::Cancelled
        } else {
            TraversalStatus::Completed
        };
        self.finish(status)
    }

    /// Fold one worker's result into the traversal.
    fn absorb(&mut self, WorkerReport { entry, report }: WorkerReport, expand: bool) {
        self.count_calls(report.calls);
        let FrontierEntry {
            path,
            reference,
            lineage,
        } = entry;
        let Some(id) = reference.content_id().cloned() else {
            return;
        };

        match report.outcome {
            Attempted::Cancelled => {
                self.interrupted = true;
                self.stats.abandoned += 1 + self.fanout.abandon(&id);
            }
            Attempted::Failed(err) => {
                warn!(%path, id = id.short(), error = %err, "node failed");
                for alias in self.fanout.fail(&id, err.clone()) {
                    self.assembler
                        .record_failure(alias.path, Some(id.clone()), err.clone());
                }
                self.assembler.record_failure(path, Some(id), err);
            }
            Attempted::Resolved(object) => {
                debug!(%path, id = id.short(), kind = %object.kind(), "resolved");
                let object = Arc::new(object);
                let aliases = self.fanout.resolve(&id, Arc::clone(&object));
                self.place(
                    Placement {
                        path,
                        id: Some(id.clone()),
                        lineage,
                        object: Arc::clone(&object),
                    },
                    expand,
                );
                for alias in aliases {
                    self.place(
                        Placement {
                            path: alias.path,
                            id: Some(id.clone()),
                            lineage: alias.lineage,
                            object: Arc::clone(&object),
                        },
                        expand,
                    );
                }
            }
        }
    }

    /// Lay out a resolved object: record a leaf, or walk a directory listing
    /// and schedule, park, or directly place each child.
    fn place(&mut self, start: Placement, expand: bool) {
        let mut work = vec![start];
        while let Some(Placement {
            path,
            id,
            lineage,
            object,
        }) = work.pop()
        {
            let entries = match &*object {
                ResolvedObject::Leaf(text) => {
                    self.assembler.record(path, text.clone());
                    continue;
                }
                ResolvedObject::Unrecognized(kind) => {
                    warn!(%path, %kind, "unrecognized object shape");
                    self.assembler
                        .record_failure(path, id, NodeError::UnknownShape(kind.clone()));
                    continue;
                }
                ResolvedObject::Directory(entries) => entries,
            };
            if !expand {
                if !entries.is_empty() {
                    self.interrupted = true;
                }
                continue;
            }

            for entry in entries {
                let child_path = path.join(&entry.name);
                if lineage.contains(&entry.id) {
                    warn!(path = %child_path, id = entry.id.short(), "cycle in object graph");
                    self.assembler.record_failure(
                        child_path,
                        Some(entry.id.clone()),
                        NodeError::Cycle {
                            id: entry.id.clone(),
                        },
                    );
                    continue;
                }
                let child_lineage = Lineage::child(&lineage, entry.id.clone());

                if self.visited.mark_object(&entry.id) {
                    self.fanout.register(entry.id.clone());
                    self.frontier.push_back(FrontierEntry {
                        path: child_path,
                        reference: self.root.child(entry.id.clone()),
                        lineage: child_lineage,
                    });
                    continue;
                }

                self.stats.deduplicated_paths += 1;
                let alias = Alias {
                    path: child_path.clone(),
                    lineage: Arc::clone(&child_lineage),
                };
                match self.fanout.attach(&entry.id, alias) {
                    Attach::Parked => {}
                    Attach::Ready(object) => work.push(Placement {
                        path: child_path,
                        id: Some(entry.id.clone()),
                        lineage: child_lineage,
                        object,
                    }),
                    Attach::Failed(err) => {
                        self.assembler
                            .record_failure(child_path, Some(entry.id.clone()), err)
                    }
                }
            }
        }
    }

    fn count_calls(&mut self, calls: u32) {
        self.stats.resolver_calls += u64::from(calls);
        self.stats.retries += u64::from(calls.saturating_sub(1));
    }

    fn finish(self, status: TraversalStatus) -> TraversalOutcome {
        let (snapshot, failures) = self.assembler.finish();
        info!(
            repo = %self.root.repo(),
            %status,
            leaves = snapshot.len(),
            failures = failures.len(),
            calls = self.stats.resolver_calls,
            retries = self.stats.retries,
            deduplicated = self.stats.deduplicated_paths,
            "traversal finished"
        );
        TraversalOutcome {
            snapshot,
            failures,
            status,
            stats: self.stats,
        }
    }
}

/// Walk `owner/repo` at `revision_expression` with default retry settings.
///
/// `revision_expression` is a commit-ish, optionally followed by `:path` to
/// start below the repository root.
pub async fn traverse_repository<R: ObjectResolver + ?Sized + 'static>(
    resolver: Arc<R>,
    owner: &str,
    repo: &str,
    revision_expression: &str,
    concurrency_limit: usize,
    cancel: CancellationToken,
) -> EngineResult<TraversalOutcome> {
    let revision = RevisionSpec::parse(revision_expression)?;
    let config = TraversalConfig::default().with_concurrency_limit(concurrency_limit);
    TraversalEngine::new(resolver, config)
        .traverse_revision(RepoCoordinates::new(owner, repo), &revision, cancel)
        .await
}
