// src/watch/watcher.rs

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};

use crate::cache::CacheStore;
use crate::errors::{Result, ReswatchError};
use crate::hash::{Digest, HashProvider};
use crate::locator::ResourceLocator;
use crate::model::{CacheKey, Group, ModelProvider, Resource};
use crate::watch::baseline::HashBaseline;
use crate::watch::detector::ChangeDetector;
use crate::watch::listener::{ChangeListener, NoopListener};
use crate::watch::memo::HashMemo;

/// Decides whether any resource of a group changed since the last check and,
/// if so, invalidates the group's cache entry.
///
/// Safe to share between threads: each [`check`](Self::check) builds its own
/// [`HashMemo`], and the only shared state is the concurrent
/// [`HashBaseline`].
#[derive(Debug)]
pub struct ResourceWatcher {
    model: Arc<dyn ModelProvider>,
    locator: Arc<dyn ResourceLocator>,
    hasher: Arc<dyn HashProvider>,
    cache: Arc<dyn CacheStore>,
    listener: Arc<dyn ChangeListener>,
    baseline: Arc<HashBaseline>,
}

/// Why a cycle stopped before committing.
#[derive(Debug)]
enum CycleAbort {
    /// Model or group lookup failed; nothing was measured.
    Resolution(ReswatchError),
    /// The cache store rejected the invalidation.
    Invalidation(ReswatchError),
}

impl ResourceWatcher {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        locator: Arc<dyn ResourceLocator>,
        hasher: Arc<dyn HashProvider>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            model,
            locator,
            hasher,
            cache,
            listener: Arc::new(NoopListener),
            baseline: Arc::new(HashBaseline::new()),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Use an existing (possibly persisted or shared) baseline.
    pub fn with_baseline(mut self, baseline: Arc<HashBaseline>) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn baseline(&self) -> &Arc<HashBaseline> {
        &self.baseline
    }

    /// Check the group named by `key` and invalidate `key` if it changed.
    ///
    /// Never fails and never panics: every error degrades to "unchanged".
    /// A cycle that completes commits the digests it measured to the
    /// baseline; an aborted cycle commits nothing.
    pub fn check(&self, key: &CacheKey) {
        let started = Instant::now();
        debug!(%key, "resource watcher started");

        let mut memo = HashMemo::new();
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| self.run_cycle(key, &mut memo)));

        match outcome {
            Ok(Ok(changed)) => {
                let committed = self.baseline.commit(memo);
                debug!(%key, changed, committed, "check cycle completed");
            }
            Ok(Err(CycleAbort::Resolution(err))) => {
                warn!(%key, "cannot resolve group for change check: {err}");
            }
            Ok(Err(CycleAbort::Invalidation(err))) => {
                error!(%key, "failed to invalidate cache entry: {err}");
            }
            Err(payload) => {
                error!(
                    %key,
                    "unexpected failure while checking for resource changes: {}",
                    panic_message(payload.as_ref())
                );
            }
        }

        debug!(
            %key,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "resource watcher finished"
        );
    }

    fn run_cycle(
        &self,
        key: &CacheKey,
        memo: &mut HashMemo,
    ) -> std::result::Result<bool, CycleAbort> {
        let model = self
            .model
            .current_model()
            .map_err(CycleAbort::Resolution)?;
        let group = model
            .group(key.group())
            .map_err(CycleAbort::Resolution)?;

        if !self.is_group_changed(group, memo) {
            return Ok(false);
        }

        self.listener.on_group_changed(key);
        debug!(%key, "detected change; invalidating cache entry");
        self.cache
            .invalidate(key)
            .map_err(CycleAbort::Invalidation)?;
        Ok(true)
    }

    /// Examine the group's resources in order and stop at the first change.
    ///
    /// Resources after the first changed one are not hashed in this cycle,
    /// so their baseline entries are refreshed on a later cycle.
    pub fn is_group_changed(&self, group: &Group, memo: &mut HashMemo) -> bool {
        debug!(
            group = %group.name(),
            resources = group.resources().len(),
            "checking group for change"
        );
        let detector = self.detector();
        for resource in group.resources() {
            if detector.is_changed(resource, memo) {
                debug!(group = %group.name(), uri = %resource.uri(), "resource changed");
                self.listener.on_resource_changed(resource);
                return true;
            }
        }
        false
    }

    /// Whether `resource` (or anything it imports) changed against the
    /// baseline. Unreadable resources are reported unchanged.
    pub fn is_changed(&self, resource: &Resource, memo: &mut HashMemo) -> bool {
        self.detector().is_changed(resource, memo)
    }

    /// Digest of `uri` for the cycle owning `memo`.
    pub fn memoized_hash(&self, uri: &str, memo: &mut HashMemo) -> Result<Digest> {
        self.detector().memoized_hash(uri, memo)
    }

    fn detector(&self) -> ChangeDetector<'_> {
        ChangeDetector {
            locator: self.locator.as_ref(),
            hasher: self.hasher.as_ref(),
            baseline: self.baseline.as_ref(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
