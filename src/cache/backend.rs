//! Cache Backend Module
//!
//! The async key/value interface the proxy engine talks to, and the
//! in-process implementation used by the server.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::cache::MemoryStore;
use crate::error::CacheError;

// == Cache Store Trait ==
/// Key/value store with per-entry expiration.
///
/// Implementations must be safe for concurrent callers. No transactional
/// semantics are assumed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `Ok(None)` on a clean miss. Any `Err` is a backend failure.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;
}

// == In-Memory Cache ==
/// [`MemoryStore`] behind an async lock.
#[derive(Debug)]
pub struct InMemoryCache {
    inner: RwLock<MemoryStore>,
}

impl InMemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: RwLock::new(MemoryStore::new(max_entries)),
        }
    }

    /// Number of resident entries, including expired ones not yet read.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        // Write lock: reads touch the LRU and may drop expired entries.
        let mut store = self.inner.write().await;
        match store.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_miss() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut store = self.inner.write().await;
        store.set(key.to_string(), value, ttl)
    }
}
