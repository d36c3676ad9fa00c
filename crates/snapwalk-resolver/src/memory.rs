use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use snapwalk_types::{ContentId, DirEntry, RepoCoordinates, ResolvedObject};
use tracing::trace;

use crate::error::{ResolveError, ResolveResult};
use crate::hasher::ContentHasher;
use crate::traits::ObjectResolver;

#[derive(Clone, Debug)]
enum Stored {
    Object(ResolvedObject),
    Binary,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum FaultKey {
    Revision(RepoCoordinates, String),
    Object(ContentId),
}

/// In-memory, HashMap-based resolver.
///
/// Intended for tests and embedding. Objects are shared by every repository
/// (content ids are global); revisions are registered per repository.
/// Queued faults are returned one per call, in order, before the real
/// answer, and every call is counted so tests can assert how often the
/// remote was hit.
pub struct InMemoryResolver {
    objects: RwLock<HashMap<ContentId, Stored>>,
    revisions: RwLock<HashMap<(RepoCoordinates, String), ContentId>>,
    faults: Mutex<HashMap<FaultKey, VecDeque<ResolveError>>>,
    calls: Mutex<HashMap<ContentId, usize>>,
    revision_calls: AtomicUsize,
    latency: Option<Duration>,
}

impl InMemoryResolver {
    /// Create a new empty resolver.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            revisions: RwLock::new(HashMap::new()),
            faults: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            revision_calls: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Sleep for `latency` on every call before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store a leaf and return its content-addressed id.
    pub fn insert_leaf(&self, text: impl Into<String>) -> ContentId {
        let text = text.into();
        let id = ContentHasher::LEAF.hash(text.as_bytes());
        self.insert_with_id(id.clone(), ResolvedObject::Leaf(text));
        id
    }

    /// Store a directory listing and return its content-addressed id.
    pub fn insert_directory(&self, entries: Vec<DirEntry>) -> ContentId {
        let id = ContentHasher::DIRECTORY.hash_listing(&entries);
        self.insert_with_id(id.clone(), ResolvedObject::Directory(entries));
        id
    }

    /// Store an object under a hand-picked id.
    pub fn insert_with_id(&self, id: impl Into<ContentId>, object: ResolvedObject) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(id.into(), Stored::Object(object));
    }

    /// Store a leaf whose payload is not text.
    pub fn insert_binary(&self, id: impl Into<ContentId>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(id.into(), Stored::Binary);
    }

    /// Remove an object, as if it had been deleted upstream.
    pub fn remove(&self, id: &ContentId) -> bool {
        self.objects
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some()
    }

    /// Point a revision expression of `repo` at an object.
    pub fn set_revision(
        &self,
        repo: &RepoCoordinates,
        expression: impl Into<String>,
        id: impl Into<ContentId>,
    ) {
        self.revisions
            .write()
            .expect("lock poisoned")
            .insert((repo.clone(), expression.into()), id.into());
    }

    /// Queue errors returned by the next calls for `id`, in order.
    pub fn inject_faults(&self, id: impl Into<ContentId>, errors: Vec<ResolveError>) {
        self.queue_faults(FaultKey::Object(id.into()), errors);
    }

    /// Queue errors returned by the next calls for a revision expression of `repo`.
    pub fn inject_revision_faults(
        &self,
        repo: &RepoCoordinates,
        expression: impl Into<String>,
        errors: Vec<ResolveError>,
    ) {
        self.queue_faults(FaultKey::Revision(repo.clone(), expression.into()), errors);
    }

    /// Number of identifier calls made for `id`.
    pub fn calls_for(&self, id: &ContentId) -> usize {
        self.calls
            .lock()
            .expect("lock poisoned")
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    /// Number of revision calls made.
    pub fn revision_calls(&self) -> usize {
        self.revision_calls.load(Ordering::SeqCst)
    }

    /// Total number of calls of either kind.
    pub fn total_calls(&self) -> usize {
        let by_id: usize = self.calls.lock().expect("lock poisoned").values().sum();
        by_id + self.revision_calls()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    fn queue_faults(&self, key: FaultKey, errors: Vec<ResolveError>) {
        self.faults
            .lock()
            .expect("lock poisoned")
            .entry(key)
            .or_default()
            .extend(errors);
    }

    fn next_fault(&self, key: &FaultKey) -> Option<ResolveError> {
        self.faults
            .lock()
            .expect("lock poisoned")
            .get_mut(key)
            .and_then(VecDeque::pop_front)
    }

    fn lookup(&self, id: &ContentId) -> ResolveResult<ResolvedObject> {
        match self.objects.read().expect("lock poisoned").get(id) {
            Some(Stored::Object(object)) => Ok(object.clone()),
            Some(Stored::Binary) => Err(ResolveError::BinaryContent),
            None => Err(ResolveError::NotFound),
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for InMemoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectResolver for InMemoryResolver {
    async fn resolve_by_revision(
        &self,
        repo: &RepoCoordinates,
        revision: &str,
    ) -> ResolveResult<ResolvedObject> {
        self.revision_calls.fetch_add(1, Ordering::SeqCst);
        trace!(%repo, revision, "in-memory revision lookup");
        self.simulate_latency().await;

        if let Some(fault) = self.next_fault(&FaultKey::Revision(repo.clone(), revision.to_string())) {
            return Err(fault);
        }
        let id = self
            .revisions
            .read()
            .expect("lock poisoned")
            .get(&(repo.clone(), revision.to_string()))
            .cloned()
            .ok_or(ResolveError::NotFound)?;
        self.lookup(&id)
    }

    async fn resolve_by_identifier(
        &self,
        _repo: &RepoCoordinates,
        id: &ContentId,
    ) -> ResolveResult<ResolvedObject> {
        *self
            .calls
            .lock()
            .expect("lock poisoned")
            .entry(id.clone())
            .or_insert(0) += 1;
        trace!(id = id.short(), "in-memory identifier lookup");
        self.simulate_latency().await;

        if let Some(fault) = self.next_fault(&FaultKey::Object(id.clone())) {
            return Err(fault);
        }
        self.lookup(id)
    }
}

impl std::fmt::Debug for InMemoryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryResolver")
            .field("object_count", &self.len())
            .field("total_calls", &self.total_calls())
            .finish()
    }
}
