//! Compiled-query cache, keyed by namespace/operation name/role/database.
//!
//! Compiling a GraphQL document to `QCode` is pure given the schema, the
//! role, and the routed database, so the result is cached and reused
//! across requests that share an operation name. Variables are not part
//! of the key — they're bound fresh every call ([`crate::bind`]).

use super::qcode::QCode;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Cache key. `namespace` separates unrelated schemas sharing one process
/// (tests, multi-tenant embeddings); most callers use `""`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub namespace: String,
    pub operation_name: String,
    pub role: String,
    pub database: String,
}

#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe LRU cache from [`CacheKey`] to compiled `QCode`.
pub struct CompilationCache {
    entries: Mutex<lru::LruCache<CacheKey, Arc<QCode>>>,
    metrics: Mutex<CacheMetrics>,
}

impl CompilationCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self { entries: Mutex::new(lru::LruCache::new(cap)), metrics: Mutex::new(CacheMetrics::default()) }
    }

    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<QCode>> {
        let mut entries = self.entries.lock().unwrap();
        let hit = entries.get(key).cloned();
        let mut metrics = self.metrics.lock().unwrap();
        if hit.is_some() {
            metrics.hits += 1;
        } else {
            metrics.misses += 1;
        }
        hit
    }

    pub fn put(&self, key: CacheKey, qcode: Arc<QCode>) {
        self.entries.lock().unwrap().put(key, qcode);
    }

    #[must_use]
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.lock().unwrap().clone()
    }

    /// Drop every cached entry. Called on schema reload: stale `TableId`s
    /// in cached `QCode` would otherwise point at the wrong table in the
    /// newly swapped-in `SchemaGraph`.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
