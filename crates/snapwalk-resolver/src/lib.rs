//! The remote object resolver seam.
//!
//! The remote object graph exposes exactly two lookups: resolve the object a
//! revision expression points at, and resolve an object by its content id.
//! Each answer is one level deep: either a leaf with text or a directory
//! listing of `(name, id)` pairs.
//!
//! # Components
//!
//! - [`ObjectResolver`] -- the async trait every transport adapter implements
//! - [`ResolveError`] -- failure taxonomy the traversal engine reacts to
//! - [`ContentHasher`] -- domain-separated hasher that mints content ids
//! - [`InMemoryResolver`] -- `HashMap`-backed resolver for tests and embedding
//!
//! # Design Rules
//!
//! 1. Both lookups are idempotent: same inputs, same answer, unless the
//!    object disappeared upstream, which surfaces as `NotFound`.
//! 2. Adapters classify failures; they never retry on their own.
//! 3. Content ids are opaque and are passed back to the remote verbatim.

pub mod error;
pub mod hasher;
pub mod memory;
pub mod traits;

pub use error::{ResolveError, ResolveResult};
pub use hasher::ContentHasher;
pub use memory::InMemoryResolver;
pub use traits::ObjectResolver;
