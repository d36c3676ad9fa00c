use snapwalk_types::{ContentId, DirEntry};

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a leaf and a directory with identical bytes never share a
/// content id.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for leaf text.
    pub const LEAF: Self = Self {
        domain: "snapwalk-leaf-v1",
    };
    /// Hasher for directory listings.
    pub const DIRECTORY: Self = Self {
        domain: "snapwalk-directory-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a directory listing.
    ///
    /// Entries are encoded in listing order as `name NUL id LF`, so two
    /// listings with the same entries in a different order are different
    /// objects.
    pub fn hash_listing(&self, entries: &[DirEntry]) -> ContentId {
        let mut data = Vec::new();
        for entry in entries {
            data.extend_from_slice(entry.name.as_bytes());
            data.push(0);
            data.extend_from_slice(entry.id.as_str().as_bytes());
            data.push(b'\n');
        }
        self.hash(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let id1 = ContentHasher::LEAF.hash(b"hello world");
        let id2 = ContentHasher::LEAF.hash(b"hello world");
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        assert_ne!(
            ContentHasher::LEAF.hash(data),
            ContentHasher::DIRECTORY.hash(data)
        );
    }

    #[test]
    fn domain_hash_differs_from_plain_digest() {
        assert_ne!(ContentHasher::LEAF.hash(b"test"), ContentId::from_bytes(b"test"));
    }

    #[test]
    fn listing_hash_depends_on_order() {
        let a = DirEntry::new("a", "id1");
        let b = DirEntry::new("b", "id2");
        let ab = ContentHasher::DIRECTORY.hash_listing(&[a.clone(), b.clone()]);
        let ba = ContentHasher::DIRECTORY.hash_listing(&[b, a]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn listing_hash_separates_name_from_id() {
        let one = ContentHasher::DIRECTORY.hash_listing(&[DirEntry::new("ab", "c")]);
        let two = ContentHasher::DIRECTORY.hash_listing(&[DirEntry::new("a", "bc")]);
        assert_ne!(one, two);
    }
}
