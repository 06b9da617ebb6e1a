//! Cache Module
//!
//! The cache store interface consumed by the proxy engine, plus an in-memory
//! implementation with TTL expiration and LRU eviction.

mod backend;
mod entry;
mod lru;
mod store;


// Re-export public types
pub use backend::{CacheStore, InMemoryCache};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use store::MemoryStore;

// == Public Constants ==
/// Maximum allowed key length in bytes (memcache-compatible)
pub const MAX_KEY_LENGTH: usize = 250;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
