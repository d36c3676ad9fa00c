//! Foundation types for snapwalk.
//!
//! This crate provides the vocabulary shared by the resolver seam and the
//! traversal engine. Every other snapwalk crate depends on `snapwalk-types`.
//!
//! # Key Types
//!
//! - [`ContentId`] — Opaque content-addressed identifier of a remote object
//! - [`ObjectRef`] — How to ask the remote for an object (by revision or by id)
//! - [`ResolvedObject`] — What the remote answered: leaf, directory, or an unrecognized shape
//! - [`TreePath`] — Path of a node from the snapshot root
//! - [`RepoCoordinates`] / [`RevisionSpec`] — Which repository and which revision

pub mod error;
pub mod id;
pub mod object;
pub mod path;
pub mod repo;

pub use error::TypeError;
pub use id::ContentId;
pub use object::{DirEntry, ObjectKind, ObjectRef, ResolvedObject};
pub use path::TreePath;
pub use repo::{RepoCoordinates, RevisionSpec};
