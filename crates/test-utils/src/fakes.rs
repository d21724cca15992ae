use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::Mutex;

use anyhow::anyhow;
use reswatch::cache::CacheStore;
use reswatch::errors::{ReswatchError, Result};
use reswatch::hash::{Blake3HashProvider, Digest, HashProvider};
use reswatch::locator::ResourceLocator;
use reswatch::model::{CacheKey, Model, ModelProvider, Resource};
use reswatch::watch::ChangeListener;

/// Records every hook invocation.
#[derive(Debug, Default)]
pub struct RecordingListener {
    resources: Mutex<Vec<String>>,
    groups: Mutex<Vec<CacheKey>>,
}

impl RecordingListener {
    pub fn changed_resources(&self) -> Vec<String> {
        self.resources.lock().unwrap().clone()
    }

    pub fn changed_groups(&self) -> Vec<CacheKey> {
        self.groups.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.resources.lock().unwrap().clear();
        self.groups.lock().unwrap().clear();
    }
}

impl ChangeListener for RecordingListener {
    fn on_resource_changed(&self, resource: &Resource) {
        self.resources.lock().unwrap().push(resource.uri().to_string());
    }

    fn on_group_changed(&self, key: &CacheKey) {
        self.groups.lock().unwrap().push(key.clone());
    }
}

/// Listener whose group hook panics, to exercise the top-level catch.
#[derive(Debug, Default)]
pub struct PanickingListener;

impl ChangeListener for PanickingListener {
    fn on_group_changed(&self, _key: &CacheKey) {
        panic!("listener exploded");
    }
}

/// Cache store that records invalidations, optionally failing them.
#[derive(Debug, Default)]
pub struct RecordingCacheStore {
    invalidated: Mutex<Vec<CacheKey>>,
    fail: bool,
}

impl RecordingCacheStore {
    pub fn failing() -> Self {
        Self {
            invalidated: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn invalidated(&self) -> Vec<CacheKey> {
        self.invalidated.lock().unwrap().clone()
    }
}

impl CacheStore for RecordingCacheStore {
    fn invalidate(&self, key: &CacheKey) -> Result<()> {
        if self.fail {
            return Err(ReswatchError::Other(anyhow!("cache store unavailable")));
        }
        self.invalidated.lock().unwrap().push(key.clone());
        Ok(())
    }
}

/// Blake3 hashing that counts how many streams it hashed.
#[derive(Debug, Default)]
pub struct CountingHashProvider {
    calls: Mutex<usize>,
}

impl CountingHashProvider {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl HashProvider for CountingHashProvider {
    fn hash(&self, reader: &mut dyn Read) -> io::Result<Digest> {
        *self.calls.lock().unwrap() += 1;
        Blake3HashProvider.hash(reader)
    }
}

/// Locator wrapper counting `locate` calls per URI.
#[derive(Debug)]
pub struct CountingLocator<L> {
    inner: L,
    calls: Mutex<HashMap<String, usize>>,
}

impl<L: ResourceLocator> CountingLocator<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self, uri: &str) -> usize {
        self.calls.lock().unwrap().get(uri).copied().unwrap_or(0)
    }
}

impl<L: ResourceLocator> ResourceLocator for CountingLocator<L> {
    fn locate(&self, uri: &str) -> Result<Box<dyn Read + Send>> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(uri.to_string())
            .or_default() += 1;
        self.inner.locate(uri)
    }
}

/// Locator that cannot resolve anything.
#[derive(Debug, Default)]
pub struct FailingLocator;

impl ResourceLocator for FailingLocator {
    fn locate(&self, uri: &str) -> Result<Box<dyn Read + Send>> {
        Err(ReswatchError::Io(io::Error::other(format!(
            "disk on fire while reading {uri}"
        ))))
    }
}

/// Model provider that always fails.
#[derive(Debug, Default)]
pub struct FailingModelProvider;

impl ModelProvider for FailingModelProvider {
    fn current_model(&self) -> Result<std::sync::Arc<Model>> {
        Err(ReswatchError::Other(anyhow!("model factory unavailable")))
    }
}
