//! Cache Entry Module
//!
//! An upstream body plus the timestamps that decide when it stops being served.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

// == Cache Entry ==
/// A cached upstream body with its expiry metadata.
///
/// Entries are never mutated in place; a `set` on the same key replaces the
/// whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored bytes, exactly as received from upstream
    pub value: Bytes,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` from now.
    pub fn new(value: Bytes, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        Duration::from_millis(self.expires_at.saturating_sub(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
