//! Nested view of a snapshot.

use std::collections::BTreeMap;

use tracing::warn;

use crate::snapshot::Snapshot;

/// A snapshot as a tree of folders and files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotTree {
    File(String),
    Folder(BTreeMap<String, SnapshotTree>),
}

impl SnapshotTree {
    /// Number of files in the tree.
    pub fn file_count(&self) -> usize {
        match self {
            Self::File(_) => 1,
            Self::Folder(children) => children.values().map(Self::file_count).sum(),
        }
    }

    /// Child node named `name`, if this is a folder that has one.
    pub fn child(&self, name: &str) -> Option<&SnapshotTree> {
        match self {
            Self::File(_) => None,
            Self::Folder(children) => children.get(name),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl Snapshot {
    /// Build the nested view.
    ///
    /// A snapshot whose only entry is at the root path (the walk started at
    /// a leaf) becomes a `File`; everything else becomes a `Folder`.
    pub fn to_tree(&self) -> SnapshotTree {
        let mut root = BTreeMap::new();
        for (path, text) in self.iter() {
            if path.is_root() {
                return SnapshotTree::File(text.to_string());
            }
            if !insert_file(&mut root, path.segments(), text) {
                warn!(%path, "leaf shadows a folder; entry left out of tree view");
            }
        }
        SnapshotTree::Folder(root)
    }
}

fn insert_file(folder: &mut BTreeMap<String, SnapshotTree>, segments: &[String], text: &str) -> bool {
    match segments {
        [] => false,
        [name] => {
            folder.insert(name.clone(), SnapshotTree::File(text.to_string()));
            true
        }
        [name, rest @ ..] => match folder
            .entry(name.clone())
            .or_insert_with(|| SnapshotTree::Folder(BTreeMap::new()))
        {
            SnapshotTree::Folder(children) => insert_file(children, rest, text),
            SnapshotTree::File(_) => false,
        },
    }
}
