//! Content hashing for cache keys and staleness checks.

use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 digest of `text`.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
