//! Content hashing for saved chart payloads

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `content`.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// First 8 hex characters, for display.
pub fn short_hash(fingerprint: &str) -> &str {
    fingerprint.get(..8).unwrap_or(fingerprint)
}
