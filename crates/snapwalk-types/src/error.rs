use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("revision expression has an empty commit-ish")]
    EmptyRevision,

    #[error("path {input:?} contains an empty segment")]
    EmptySegment { input: String },
}
