//! Fixed-TTL expiry policy with an injectable clock.

use chrono::{DateTime, Duration, Utc};

use super::index::CacheEntry;

/// Time source for expiry decisions.
///
/// The store is constructed with [`SystemClock`] in production; tests inject
/// a manual clock so expiry behavior is deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed time-to-live measured from an entry's creation time.
///
/// The TTL is a configuration value shared by every entry in a tier, never
/// computed per-entry.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryPolicy {
    ttl: Duration,
}

impl ExpiryPolicy {
    /// Default TTL: one week.
    pub const DEFAULT_TTL_DAYS: i64 = 7;

    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn days(days: i64) -> Self {
        Self { ttl: Duration::days(days) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether `entry` is stale at `now`.
    ///
    /// An entry created exactly TTL ago is still live; it expires strictly
    /// after `created_at + ttl`.
    pub fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now > entry.created_at + self.ttl
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::days(Self::DEFAULT_TTL_DAYS)
    }
}
