//! Paths of nodes relative to the root of a walk.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Ordered name segments from the root to a node.
///
/// The root is the empty sequence. Paths are built only by [`TreePath::join`]
/// during a walk, so two distinct paths never name the same node even when
/// they share an underlying content id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// The root path (empty).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Child path of `self` named `name`.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(name.to_string());
        Self(segments)
    }

    /// Parse a `/`-separated path. The empty string is the root.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let segments: Vec<String> = s.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(TypeError::EmptySegment { input: s.to_string() });
        }
        Ok(Self(segments))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_is_empty() {
        let root = TreePath::root();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.to_string(), "");
        assert!(root.file_name().is_none());
    }

    #[test]
    fn join_appends_segment() {
        let p = TreePath::root().join("sub").join("b.txt");
        assert_eq!(p.to_string(), "sub/b.txt");
        assert_eq!(p.depth(), 2);
        assert_eq!(p.file_name(), Some("b.txt"));
    }

    #[test]
    fn join_leaves_parent_untouched() {
        let parent = TreePath::root().join("sub");
        let _child = parent.join("x");
        assert_eq!(parent.to_string(), "sub");
    }

    #[test]
    fn parse_splits_on_slash() {
        let p = TreePath::parse("a/b/c").unwrap();
        assert_eq!(p.segments(), ["a", "b", "c"]);
        assert_eq!(TreePath::parse("").unwrap(), TreePath::root());
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(matches!(
            TreePath::parse("a//b"),
            Err(TypeError::EmptySegment { .. })
        ));
        assert!(TreePath::parse("/a").is_err());
    }

    #[test]
    fn ordering_is_by_segment() {
        // "sub/b.txt" sorts before "sub.txt" segment-wise even though
        // '/' > '.' would put it after as a flat string.
        let nested = TreePath::parse("sub/b.txt").unwrap();
        let sibling = TreePath::parse("sub.txt").unwrap();
        assert!(nested < sibling);
        assert!(TreePath::root() < nested);
    }

    proptest! {
        #[test]
        fn join_extends_depth_by_one(
            segs in proptest::collection::vec("[a-z0-9._-]{1,8}", 0..6),
            name in "[a-z0-9._-]{1,8}",
        ) {
            let parent = segs.iter().fold(TreePath::root(), |p, s| p.join(s));
            let child = parent.join(&name);
            prop_assert_eq!(child.depth(), parent.depth() + 1);
            prop_assert_eq!(child.file_name(), Some(name.as_str()));
            prop_assert_eq!(&child.segments()[..parent.depth()], parent.segments());
            prop_assert!(parent < child);
        }

        #[test]
        fn display_parses_back(segs in proptest::collection::vec("[a-z0-9._-]{1,8}", 0..6)) {
            let path = segs.iter().fold(TreePath::root(), |p, s| p.join(s));
            prop_assert_eq!(TreePath::parse(&path.to_string()).unwrap(), path);
        }
    }
}
