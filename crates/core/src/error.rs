//! Unified error types for newsdeck.

/// Unified error types for the newsdeck core.
///
/// Storage errors are surfaced to callers so they can fall back to returning
/// fresh payloads uncached; everything else in the cache subsystem degrades
/// silently (a corrupt index reads as empty, a dangling entry reads as a miss).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cache directory or artifact I/O failed.
    #[error("STORAGE: {0}")]
    Storage(#[from] std::io::Error),

    /// Index document could not be serialized.
    #[error("STORAGE: index serialization failed: {0}")]
    IndexSerialize(#[from] serde_json::Error),

    /// A cache key normalized to the empty string.
    #[error("INVALID_KEY: {0}")]
    InvalidKey(String),
}
