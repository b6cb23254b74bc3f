//! Content-addressed cache key generation.
//!
//! Keys are derived from a caller-supplied identity string (a URL, a search
//! query). The identity is case- and whitespace-normalized before hashing so
//! that semantically equal requests always resolve to the same key, and the
//! hex digest doubles as the artifact file stem — never a name derived from
//! unsanitized input.

use sha2::{Digest, Sha256};

/// Normalize a cache identity: trim surrounding whitespace, lowercase.
pub fn normalize(identity: &str) -> String {
    identity.trim().to_lowercase()
}

/// Compute the cache key for an identity string.
///
/// The key is the SHA-256 hex digest of the normalized identity.
pub fn cache_key(identity: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(identity).as_bytes());
    hex::encode(hasher.finalize())
}
