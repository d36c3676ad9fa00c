//! Fan-out of resolved objects to every path that references them.
//!
//! Each content id is fetched once. Paths that reach an id while its fetch
//! is in flight are parked here and materialized when it lands; paths that
//! reach it afterwards are materialized straight from the cached result.

use std::collections::HashMap;
use std::sync::Arc;

use snapwalk_types::{ContentId, ResolvedObject, TreePath};

use crate::error::NodeError;

/// Ids on the way from the root to a node, used to refuse cycles when a
/// cached directory is expanded under a new path.
#[derive(Debug, Default)]
pub struct Lineage {
    id: Option<ContentId>,
    parent: Option<Arc<Lineage>>,
}

impl Lineage {
    pub fn root(id: Option<ContentId>) -> Arc<Self> {
        Arc::new(Self { id, parent: None })
    }

    pub fn child(parent: &Arc<Self>, id: ContentId) -> Arc<Self> {
        Arc::new(Self {
            id: Some(id),
            parent: Some(Arc::clone(parent)),
        })
    }

    /// Whether `id` appears on this lineage.
    pub fn contains(&self, id: &ContentId) -> bool {
        let mut node = Some(self);
        while let Some(current) = node {
            if current.id.as_ref() == Some(id) {
                return true;
            }
            node = current.parent.as_deref();
        }
        false
    }
}

/// A path waiting on an id that is still being fetched.
#[derive(Debug)]
pub struct Alias {
    pub path: TreePath,
    pub lineage: Arc<Lineage>,
}

#[derive(Debug)]
enum Slot {
    Pending(Vec<Alias>),
    Resolved(Arc<ResolvedObject>),
    Failed(NodeError),
}

/// What a newly discovered path should do about an id already scheduled.
#[derive(Debug)]
pub enum Attach {
    /// Fetch in flight; the path was parked.
    Parked,
    /// Already fetched; materialize from this object.
    Ready(Arc<ResolvedObject>),
    /// Already failed; the path fails the same way.
    Failed(NodeError),
}

/// Per-traversal table of scheduled ids and their results.
#[derive(Debug, Default)]
pub struct FanOutTable {
    slots: HashMap<ContentId, Slot>,
}

impl FanOutTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a slot for an id that was just scheduled.
    pub fn register(&mut self, id: ContentId) {
        self.slots.entry(id).or_insert_with(|| Slot::Pending(Vec::new()));
    }

    /// A further path reached an already scheduled id.
    pub fn attach(&mut self, id: &ContentId, alias: Alias) -> Attach {
        match self.slots.get_mut(id) {
            Some(Slot::Pending(aliases)) => {
                aliases.push(alias);
                Attach::Parked
            }
            Some(Slot::Resolved(object)) => Attach::Ready(Arc::clone(object)),
            Some(Slot::Failed(err)) => Attach::Failed(err.clone()),
            None => {
                self.slots.insert(id.clone(), Slot::Pending(vec![alias]));
                Attach::Parked
            }
        }
    }

    /// Store the fetched object; returns the parked aliases.
    pub fn resolve(&mut self, id: &ContentId, object: Arc<ResolvedObject>) -> Vec<Alias> {
        self.settle(id, Slot::Resolved(object))
    }

    /// Store the failure; returns the parked aliases.
    pub fn fail(&mut self, id: &ContentId, err: NodeError) -> Vec<Alias> {
        self.settle(id, Slot::Failed(err))
    }

    /// Drop an id whose fetch was cancelled, along with its parked aliases.
    pub fn abandon(&mut self, id: &ContentId) -> usize {
        match self.slots.remove(id) {
            Some(Slot::Pending(aliases)) => aliases.len(),
            _ => 0,
        }
    }

    /// Number of ids with a stored result.
    pub fn settled(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| !matches!(slot, Slot::Pending(_)))
            .count()
    }

    fn settle(&mut self, id: &ContentId, slot: Slot) -> Vec<Alias> {
        match self.slots.insert(id.clone(), slot) {
            Some(Slot::Pending(aliases)) => aliases,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(path: &str) -> Alias {
        Alias {
            path: TreePath::parse(path).unwrap(),
            lineage: Lineage::root(None),
        }
    }

    #[test]
    fn pending_id_parks_aliases_until_resolved() {
        let mut table = FanOutTable::new();
        let id = ContentId::new("id1");
        table.register(id.clone());

        assert!(matches!(table.attach(&id, alias("x/a.txt")), Attach::Parked));
        assert!(matches!(table.attach(&id, alias("y/a.txt")), Attach::Parked));

        let parked = table.resolve(&id, Arc::new(ResolvedObject::Leaf("hi".into())));
        let paths: Vec<String> = parked.iter().map(|a| a.path.to_string()).collect();
        assert_eq!(paths, ["x/a.txt", "y/a.txt"]);
        assert_eq!(table.settled(), 1);
    }

    #[test]
    fn resolved_id_is_ready_for_late_paths() {
        let mut table = FanOutTable::new();
        let id = ContentId::new("id1");
        table.register(id.clone());
        table.resolve(&id, Arc::new(ResolvedObject::Leaf("hi".into())));

        let Attach::Ready(object) = table.attach(&id, alias("late.txt")) else {
            panic!("expected ready");
        };
        assert_eq!(*object, ResolvedObject::Leaf("hi".into()));
    }

    #[test]
    fn failed_id_fails_late_paths() {
        let mut table = FanOutTable::new();
        let id = ContentId::new("gone");
        table.register(id.clone());
        let parked = table.fail(&id, NodeError::NotFound);
        assert!(parked.is_empty());

        assert!(matches!(
            table.attach(&id, alias("late.txt")),
            Attach::Failed(NodeError::NotFound)
        ));
    }

    #[test]
    fn abandon_drops_parked_aliases() {
        let mut table = FanOutTable::new();
        let id = ContentId::new("id1");
        table.register(id.clone());
        table.attach(&id, alias("a"));
        assert_eq!(table.abandon(&id), 1);
        assert_eq!(table.settled(), 0);
    }

    #[test]
    fn lineage_finds_ancestors() {
        let root = Lineage::root(None);
        let a = Lineage::child(&root, ContentId::new("a"));
        let b = Lineage::child(&a, ContentId::new("b"));
        assert!(b.contains(&ContentId::new("a")));
        assert!(b.contains(&ContentId::new("b")));
        assert!(!a.contains(&ContentId::new("b")));
        assert!(!root.contains(&ContentId::new("a")));
    }
}
