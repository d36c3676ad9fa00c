use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Owner and name of a remote repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
}

impl RepoCoordinates {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A commit-ish, optionally narrowed to a sub-path of its tree.
///
/// The remote accepts `<commit-ish>:<path>` to start a walk at a tree;
/// `expression()` renders that form. `main` names the commit while `main:`
/// names its root tree, so the colon is kept even when the path is empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionSpec {
    commit_ish: String,
    subpath: Vec<String>,
    tree: bool,
}

impl RevisionSpec {
    pub fn new(commit_ish: impl Into<String>) -> Result<Self, TypeError> {
        let commit_ish = commit_ish.into();
        if commit_ish.trim().is_empty() {
            return Err(TypeError::EmptyRevision);
        }
        Ok(Self {
            commit_ish,
            subpath: Vec::new(),
            tree: false,
        })
    }

    /// Address the tree at `path`. Leading, trailing, and repeated `/` are
    /// dropped; an empty path addresses the root tree.
    pub fn with_subpath(mut self, path: &str) -> Self {
        self.tree = true;
        self.subpath = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Parse `main` or `main:docs/api`. Splits at the first `:`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        match s.split_once(':') {
            Some((commit_ish, path)) => Ok(Self::new(commit_ish)?.with_subpath(path)),
            None => Self::new(s),
        }
    }

    pub fn commit_ish(&self) -> &str {
        &self.commit_ish
    }

    pub fn subpath(&self) -> &[String] {
        &self.subpath
    }

    /// Whether the expression addresses a tree (`commit-ish:path`) rather
    /// than the commit itself.
    pub fn is_tree(&self) -> bool {
        self.tree
    }

    /// The revision expression sent to the remote.
    pub fn expression(&self) -> String {
        if self.tree {
            format!("{}:{}", self.commit_ish, self.subpath.join("/"))
        } else {
            self.commit_ish.clone()
        }
    }
}

impl fmt::Display for RevisionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}
