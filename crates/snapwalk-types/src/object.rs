use serde::{Deserialize, Serialize};

use crate::id::ContentId;
use crate::repo::RepoCoordinates;

/// How to address a remote object.
///
/// `ByRevision` is only ever used for the root of a walk: its content id is
/// unknown until the remote answers. Every object discovered afterwards is
/// addressed `ByIdentifier`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectRef {
    ByRevision {
        repo: RepoCoordinates,
        revision: String,
    },
    ByIdentifier {
        repo: RepoCoordinates,
        id: ContentId,
    },
}

impl ObjectRef {
    pub fn by_revision(repo: RepoCoordinates, revision: impl Into<String>) -> Self {
        Self::ByRevision {
            repo,
            revision: revision.into(),
        }
    }

    pub fn by_identifier(repo: RepoCoordinates, id: ContentId) -> Self {
        Self::ByIdentifier { repo, id }
    }

    pub fn repo(&self) -> &RepoCoordinates {
        match self {
            Self::ByRevision { repo, .. } | Self::ByIdentifier { repo, .. } => repo,
        }
    }

    /// The content id, if this reference carries one.
    pub fn content_id(&self) -> Option<&ContentId> {
        match self {
            Self::ByRevision { .. } => None,
            Self::ByIdentifier { id, .. } => Some(id),
        }
    }

    /// Derive the reference of a child object in the same repository.
    pub fn child(&self, id: ContentId) -> Self {
        Self::ByIdentifier {
            repo: self.repo().clone(),
            id,
        }
    }
}

/// A single named entry of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub id: ContentId,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, id: impl Into<ContentId>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// What the remote returned for a reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedObject {
    /// Terminal object with textual content.
    Leaf(String),
    /// Listing of named children, in the order the remote returned them.
    Directory(Vec<DirEntry>),
    /// The remote answered with a shape that is neither of the above
    /// (e.g. a commit or tag object). Carries the remote's kind label.
    Unrecognized(String),
}

impl ResolvedObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Leaf(_) => ObjectKind::Leaf,
            Self::Directory(_) => ObjectKind::Directory,
            Self::Unrecognized(_) => ObjectKind::Unrecognized,
        }
    }
}

/// Discriminant of [`ResolvedObject`], for logging and counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Leaf,
    Directory,
    Unrecognized,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf => write!(f, "leaf"),
            Self::Directory => write!(f, "directory"),
            Self::Unrecognized => write!(f, "unrecognized"),
        }
    }
}
