//! Content hashing utility for deduplication.

use sha2::{Digest, Sha256};

/// Content hasher for deduplication.
///
/// Only leading and trailing whitespace is normalized away. Case and inner
/// whitespace are significant, so the hash of a stored file read back from
/// disk matches the hash computed when it was ingested.
///
/// # Example
///
/// ```rust
/// use aurora_memory::services::ContentHasher;
///
/// let hash = ContentHasher::hash("eu gosto de cafe quente");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, ContentHasher::hash("  eu gosto de cafe quente\n"));
/// assert_ne!(hash, ContentHasher::hash("Eu gosto de cafe quente"));
/// ```
pub struct ContentHasher;

impl ContentHasher {
    /// Computes the lowercase hex SHA-256 of the trimmed content.
    #[must_use]
    pub fn hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(Self::normalize(content).as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Normalizes content for hashing.
    #[must_use]
    pub fn normalize(content: &str) -> &str {
        content.trim()
    }
}
