use std::collections::HashSet;
use std::sync::Mutex;

use snapwalk_types::ContentId;

/// Identity of an object scheduled for resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VisitKey {
    /// A root addressed by revision; it has no content id until resolved.
    Root,
    Object(ContentId),
}

/// Identities already scheduled during one traversal.
///
/// `mark_if_absent` is an atomic test-and-set, so at most one caller ever
/// schedules a given identity no matter how many tasks race on it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: Mutex<HashSet<VisitKey>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key`; returns `true` if it was not marked before.
    pub fn mark_if_absent(&self, key: VisitKey) -> bool {
        self.keys.lock().expect("lock poisoned").insert(key)
    }

    /// Shorthand for marking an object id.
    pub fn mark_object(&self, id: &ContentId) -> bool {
        self.mark_if_absent(VisitKey::Object(id.clone()))
    }

    pub fn contains(&self, key: &VisitKey) -> bool {
        self.keys.lock().expect("lock poisoned").contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().expect("lock poisoned").is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn first_mark_wins() {
        let visited = VisitedSet::new();
        let id = ContentId::new("id1");
        assert!(visited.mark_object(&id));
        assert!(!visited.mark_object(&id));
        assert!(visited.contains(&VisitKey::Object(id)));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn root_placeholder_is_distinct_from_objects() {
        let visited = VisitedSet::new();
        assert!(visited.mark_if_absent(VisitKey::Root));
        assert!(visited.mark_object(&ContentId::new("root")));
        assert!(!visited.mark_if_absent(VisitKey::Root));
        assert_eq!(visited.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_marks_admit_exactly_one() {
        let visited = Arc::new(VisitedSet::new());
        let id = ContentId::new("contended");

        let mut handles = Vec::new();
        for _ in 0..32 {
            let visited = Arc::clone(&visited);
            let id = id.clone();
            handles.push(tokio::spawn(async move { visited.mark_object(&id) }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
