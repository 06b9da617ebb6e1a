//! Memory Store Module
//!
//! Synchronous cache engine combining HashMap storage with LRU tracking and
//! lazy TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::cache::{CacheEntry, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::CacheError;

// == Memory Store ==
/// Bounded key/value storage with per-entry expiry.
///
/// Expired entries are only dropped when they are read or when their slot is
/// needed; there is no sweep.
#[derive(Debug)]
pub struct MemoryStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a new MemoryStore holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries,
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`.
    ///
    /// An existing entry is replaced whole. At capacity the least recently
    /// used entry is evicted first.
    pub fn set(&mut self, key: String, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidEntry(format!(
                "Key must be 1 to {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidEntry(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if ttl.is_zero() {
            return Err(CacheError::InvalidEntry(
                "Zero TTL entries are not stored".to_string(),
            ));
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    debug!("Evicted least recently used entry: {}", evicted);
                }
                None => {
                    return Err(CacheError::CacheFull(
                        "Cache is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        self.lru.touch(&key);

        Ok(())
    }

    // == Get ==
    /// Retrieves the bytes stored under `key`.
    ///
    /// Expired entries are removed and reported as `Expired`.
    pub fn get(&mut self, key: &str) -> Result<Bytes, CacheError> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                self.lru.touch(key);
                return Ok(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            return Err(CacheError::Expired(key.to_string()));
        }

        Err(CacheError::NotFound(key.to_string()))
    }

    // == Delete ==
    #[cfg(test)]
    pub fn delete(&mut self, key: &str) -> Result<(), CacheError> {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            Ok(())
        } else {
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
