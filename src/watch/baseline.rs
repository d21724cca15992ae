// src/watch/baseline.rs

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::hash::Digest;
use crate::watch::memo::HashMemo;
use crate::watch::storage::BaselineStorage;

/// Last confirmed digest per resource URI.
///
/// Shared by every check cycle. Entries are only added or overwritten by
/// [`HashBaseline::commit`]; nothing is ever removed. Backed by a sharded
/// concurrent map so cycles for unrelated groups do not serialize.
#[derive(Debug, Default)]
pub struct HashBaseline {
    hashes: DashMap<String, Digest>,
    storage: Option<Mutex<Box<dyn BaselineStorage>>>,
}

impl HashBaseline {
    /// Empty, memory-only baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline seeded from `storage` and written back after every commit.
    pub fn with_storage(storage: Box<dyn BaselineStorage>) -> Result<Self> {
        let hashes: DashMap<String, Digest> = storage.load()?.into_iter().collect();
        Ok(Self {
            hashes,
            storage: Some(Mutex::new(storage)),
        })
    }

    pub fn get(&self, uri: &str) -> Option<Digest> {
        self.hashes.get(uri).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.hashes.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn snapshot(&self) -> HashMap<String, Digest> {
        self.hashes
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Merge every digest measured in a cycle into the baseline, consuming
    /// the memo. Returns the number of entries written.
    pub fn commit(&self, memo: HashMemo) -> usize {
        let mut written = 0;
        for (uri, digest) in memo {
            self.hashes.insert(uri, digest);
            written += 1;
        }
        if written > 0 {
            self.persist();
        }
        written
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let storage = storage.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Snapshot under the lock so the last writer always saves the newest state.
        let snapshot = self.snapshot();
        match storage.save(&snapshot) {
            Ok(()) => debug!(entries = snapshot.len(), "persisted hash baseline"),
            Err(err) => warn!("failed to persist hash baseline: {err:#}"),
        }
    }
}
