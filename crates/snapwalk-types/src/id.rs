use std::fmt;

use serde::{Deserialize, Serialize};

/// Content-addressed identifier of a remote object.
///
/// The token is opaque: it is compared, hashed, and echoed back to the
/// remote, never parsed. Identical content always carries the same
/// `ContentId`, which is what makes deduplication across paths sound.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap a token returned by the remote.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Mint an identifier from raw bytes (hex-encoded BLAKE3 digest).
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_hash(*blake3::hash(data).as_bytes())
    }

    /// Create an identifier from a pre-computed 32-byte hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hex::encode(hash))
    }

    /// The token as the remote knows it.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.short())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for ContentId {
    fn from(token: String) -> Self {
        Self(token)
    }
}
