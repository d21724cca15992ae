#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use reswatch::cache::CacheStore;
use reswatch::config::{ConfigFile, ConfigSection, GroupConfig, RawConfigFile, ResourceConfig};
use reswatch::fs::mock::MockFileSystem;
use reswatch::hash::{Blake3HashProvider, HashProvider};
use reswatch::locator::{FsResourceLocator, ResourceLocator};
use reswatch::model::{Group, Model, ModelProvider, Resource, StaticModelProvider};
use reswatch::types::ResourceType;
use reswatch::watch::{ChangeListener, ResourceWatcher};

use crate::fakes::{RecordingCacheStore, RecordingListener};

/// Base directory used by mock-filesystem fixtures.
pub const WEB_ROOT: &str = "/web";

/// Builder for a `Model` snapshot.
pub struct ModelBuilder {
    groups: Vec<Group>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    pub fn with_group(mut self, name: &str, resources: Vec<Resource>) -> Self {
        self.groups.push(Group::new(name, resources));
        self
    }

    pub fn build(self) -> Model {
        Model::new(self.groups)
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a validated `ConfigFile` without going through TOML.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                group: BTreeMap::new(),
            },
        }
    }

    pub fn with_group(mut self, name: &str, group: GroupConfig) -> Self {
        self.config.group.insert(name.to_string(), group);
        self
    }

    pub fn update_period_secs(mut self, secs: u64) -> Self {
        self.config.config.update_period_secs = secs;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a `[group.<name>]` section.
pub struct GroupConfigBuilder {
    group: GroupConfig,
}

impl GroupConfigBuilder {
    pub fn new() -> Self {
        Self {
            group: GroupConfig::default(),
        }
    }

    pub fn js(mut self, uri: &str) -> Self {
        self.group
            .resources
            .push(ResourceConfig::new(uri, ResourceType::Script));
        self
    }

    pub fn css(mut self, uri: &str) -> Self {
        self.group
            .resources
            .push(ResourceConfig::new(uri, ResourceType::Stylesheet));
        self
    }

    pub fn include(mut self, group: &str) -> Self {
        self.group.groups.push(group.to_string());
        self
    }

    pub fn build(self) -> GroupConfig {
        self.group
    }
}

impl Default for GroupConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A watcher over an in-memory filesystem rooted at [`WEB_ROOT`], with
/// recording collaborators so tests can observe what happened.
pub struct WatcherFixture {
    pub fs: MockFileSystem,
    pub cache: Arc<RecordingCacheStore>,
    pub listener: Arc<RecordingListener>,
    pub watcher: ResourceWatcher,
}

impl WatcherFixture {
    pub fn new(model: Model) -> Self {
        let fs = MockFileSystem::new();
        let locator = FsResourceLocator::new(Arc::new(fs.clone()), WEB_ROOT);
        Self::with_parts(
            fs,
            Arc::new(StaticModelProvider::new(model)),
            Arc::new(locator),
            Arc::new(Blake3HashProvider),
        )
    }

    pub fn with_parts(
        fs: MockFileSystem,
        model: Arc<dyn ModelProvider>,
        locator: Arc<dyn ResourceLocator>,
        hasher: Arc<dyn HashProvider>,
    ) -> Self {
        let cache = Arc::new(RecordingCacheStore::default());
        let listener = Arc::new(RecordingListener::default());
        let watcher = ResourceWatcher::new(
            model,
            locator,
            hasher,
            Arc::clone(&cache) as Arc<dyn CacheStore>,
        )
        .with_listener(Arc::clone(&listener) as Arc<dyn ChangeListener>);
        Self {
            fs,
            cache,
            listener,
            watcher,
        }
    }

    /// Write (or overwrite) a resource below [`WEB_ROOT`].
    pub fn write(&self, uri: &str, content: &str) {
        self.fs.add_file(web_path(uri), content);
    }

    pub fn remove(&self, uri: &str) {
        self.fs.remove_file(web_path(uri));
    }
}

pub fn web_path(uri: &str) -> String {
    format!("{}/{}", WEB_ROOT, uri.trim_start_matches('/'))
}
