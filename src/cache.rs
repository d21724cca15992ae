// src/cache.rs

//! Store of derived artifacts, keyed by [`CacheKey`].
//!
//! The watcher never reads artifacts; it only writes tombstones so the next
//! reader knows to rebuild.

use std::fmt::Debug;

use dashmap::DashMap;
use tracing::debug;

use crate::errors::Result;
use crate::model::CacheKey;

pub trait CacheStore: Send + Sync + Debug {
    /// Mark the entry for `key` as requiring regeneration.
    fn invalidate(&self, key: &CacheKey) -> Result<()>;
}

/// In-memory artifact cache.
///
/// `None` values are tombstones left by [`CacheStore::invalidate`].
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<CacheKey, Option<String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: CacheKey, content: impl Into<String>) {
        self.entries.insert(key, Some(content.into()));
    }

    /// Cached content, or `None` when missing or invalidated.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).and_then(|entry| entry.value().clone())
    }

    /// True if `key` currently holds a tombstone.
    pub fn is_invalidated(&self, key: &CacheKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.value().is_none())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn invalidate(&self, key: &CacheKey) -> Result<()> {
        self.entries.insert(key.clone(), None);
        debug!(%key, "cache entry invalidated");
        Ok(())
    }
}
