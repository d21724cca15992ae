// src/watch/listener.rs

use std::fmt::Debug;

use tracing::info;

use crate::model::{CacheKey, Resource};

/// Hooks invoked by the watcher when a change is detected.
///
/// Within one cycle, `on_resource_changed` fires at most once (for the
/// resource that triggered invalidation) and `on_group_changed` fires at
/// most once, right before the cache store is written.
pub trait ChangeListener: Send + Sync + Debug {
    fn on_resource_changed(&self, _resource: &Resource) {}
    fn on_group_changed(&self, _key: &CacheKey) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ChangeListener for NoopListener {}

/// Reports detected changes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl ChangeListener for LoggingListener {
    fn on_resource_changed(&self, resource: &Resource) {
        info!(uri = %resource.uri(), kind = %resource.kind(), "resource changed");
    }

    fn on_group_changed(&self, key: &CacheKey) {
        info!(%key, "group changed; invalidating cache entry");
    }
}
