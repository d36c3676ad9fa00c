use std::collections::BTreeMap;
use std::sync::Mutex;

use snapwalk_types::{ContentId, TreePath};

use crate::error::{NodeError, NodeFailure};

/// Materialized mapping from path to leaf content for one traversal.
///
/// Entries are kept sorted by path, so iteration order is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<TreePath, String>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content at a `/`-separated path (`""` is the root).
    pub fn get(&self, path: &str) -> Option<&str> {
        let path = TreePath::parse(path).ok()?;
        self.get_path(&path)
    }

    pub fn get_path(&self, path: &TreePath) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &TreePath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TreePath, &str)> {
        self.entries.iter().map(|(path, text)| (path, text.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &TreePath> {
        self.entries.keys()
    }

    /// Sum of content lengths in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|text| text.len() as u64).sum()
    }
}

impl FromIterator<(TreePath, String)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (TreePath, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Collects leaves and failures as resolutions land.
///
/// Both recording methods take `&self` and are safe to call from several
/// tasks at once.
#[derive(Debug, Default)]
pub struct SnapshotAssembler {
    entries: Mutex<BTreeMap<TreePath, String>>,
    failures: Mutex<Vec<NodeFailure>>,
}

impl SnapshotAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the content of the leaf at `path`.
    pub fn record(&self, path: TreePath, content: String) {
        self.entries
            .lock()
            .expect("lock poisoned")
            .insert(path, content);
    }

    /// Record that `path` could not be materialized.
    pub fn record_failure(&self, path: TreePath, id: Option<ContentId>, error: NodeError) {
        self.failures
            .lock()
            .expect("lock poisoned")
            .push(NodeFailure { path, id, error });
    }

    pub fn leaf_count(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.lock().expect("lock poisoned").len()
    }

    /// The snapshot and the failures, sorted by path.
    pub fn finish(self) -> (Snapshot, Vec<NodeFailure>) {
        let entries = self.entries.into_inner().expect("lock poisoned");
        let mut failures = self.failures.into_inner().expect("lock poisoned");
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        (Snapshot { entries }, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn path(s: &str) -> TreePath {
        TreePath::parse(s).unwrap()
    }

    #[test]
    fn lookup_by_string_and_path() {
        let snapshot: Snapshot = [
            (path("a.txt"), "hello".to_string()),
            (path("sub/b.txt"), "world".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.get("a.txt"), Some("hello"));
        assert_eq!(snapshot.get_path(&path("sub/b.txt")), Some("world"));
        assert_eq!(snapshot.get("sub"), None);
        assert_eq!(snapshot.get("bad//path"), None);
        assert_eq!(snapshot.total_bytes(), 10);
    }

    #[test]
    fn iteration_is_sorted_by_path() {
        let snapshot: Snapshot = [
            (path("z"), String::new()),
            (path("a/b"), String::new()),
            (path("a"), String::new()),
        ]
        .into_iter()
        .collect();
        let order: Vec<String> = snapshot.paths().map(ToString::to_string).collect();
        assert_eq!(order, ["a", "a/b", "z"]);
    }

    #[test]
    fn finish_sorts_failures() {
        let assembler = SnapshotAssembler::new();
        assembler.record_failure(path("z"), None, NodeError::NotFound);
        assembler.record_failure(path("a"), Some(ContentId::new("x")), NodeError::BinaryContent);
        assembler.record(path("m"), "text".into());
        assert_eq!(assembler.leaf_count(), 1);
        assert_eq!(assembler.failure_count(), 2);

        let (snapshot, failures) = assembler.finish();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(failures[0].path, path("a"));
        assert_eq!(failures[1].path, path("z"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_are_all_kept() {
        let assembler = Arc::new(SnapshotAssembler::new());
        let mut handles = Vec::new();
        for i in 0..64 {
            let assembler = Arc::clone(&assembler);
            handles.push(tokio::spawn(async move {
                if i % 4 == 0 {
                    assembler.record_failure(TreePath::root().join(&format!("f{i}")), None, NodeError::NotFound);
                } else {
                    assembler.record(TreePath::root().join(&format!("l{i}")), i.to_string());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let assembler = Arc::try_unwrap(assembler).unwrap();
        let (snapshot, failures) = assembler.finish();
        assert_eq!(snapshot.len(), 48);
        assert_eq!(failures.len(), 16);
    }
}
