// src/config/model.rs

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::model::{Group, Model, Resource};
use crate::types::{HashStorageMode, ResourceType};

/// Model file exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [config]
/// base_dir = "web"
/// update_period_secs = 5
///
/// [group.base]
/// resources = [{ uri = "js/lib.js", type = "js" }]
///
/// [group.app]
/// groups = ["base"]
/// resources = [{ uri = "css/main.css", type = "css" }]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// All groups from `[group.<name>]`, keyed by group name.
    #[serde(default)]
    pub group: BTreeMap<String, GroupConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Directory resource URIs are resolved against, relative to the model
    /// file's own directory.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Seconds between two periodic check cycles.
    #[serde(default = "default_update_period_secs")]
    pub update_period_secs: u64,

    #[serde(default)]
    pub hash_storage_mode: HashStorageMode,

    /// Also trigger a cycle whenever something under `base_dir` changes.
    #[serde(default)]
    pub watch_filesystem: bool,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_update_period_secs() -> u64 {
    5
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            update_period_secs: default_update_period_secs(),
            hash_storage_mode: HashStorageMode::default(),
            watch_filesystem: false,
        }
    }
}

/// `[group.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupConfig {
    /// Names of other groups whose resources are included ahead of this
    /// group's own resources.
    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceConfig {
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
}

impl ResourceConfig {
    pub fn new(uri: impl Into<String>, kind: ResourceType) -> Self {
        Self {
            uri: uri.into(),
            kind,
        }
    }
}

/// Validated model file. Only constructed through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    group: BTreeMap<String, GroupConfig>,
    root: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        group: BTreeMap<String, GroupConfig>,
    ) -> Self {
        Self {
            config,
            group,
            root: PathBuf::from("."),
        }
    }

    /// Directory the model file was loaded from; `base_dir` is relative to it.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn config(&self) -> &ConfigSection {
        &self.config
    }

    pub fn groups(&self) -> &BTreeMap<String, GroupConfig> {
        &self.group
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Effective directory resource URIs resolve against.
    pub fn base_dir(&self) -> PathBuf {
        if self.config.base_dir.is_absolute() {
            self.config.base_dir.clone()
        } else {
            self.root.join(&self.config.base_dir)
        }
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_secs(self.config.update_period_secs)
    }

    /// Flatten every group (following group references) into a model snapshot.
    pub fn to_model(&self) -> Model {
        Model::new(
            self.group
                .keys()
                .map(|name| Group::new(name.clone(), self.flatten_group(name))),
        )
    }

    /// Resources of `name`: referenced groups first, in declaration order,
    /// then the group's own. Repeated URIs keep their first position.
    ///
    /// Assumes validated (acyclic) references.
    fn flatten_group(&self, name: &str) -> Vec<Resource> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_resources(name, &mut out, &mut seen);
        out
    }

    fn collect_resources(
        &self,
        name: &str,
        out: &mut Vec<Resource>,
        seen: &mut HashSet<String>,
    ) {
        let Some(group) = self.group.get(name) else {
            return;
        };
        for referenced in &group.groups {
            self.collect_resources(referenced, out, seen);
        }
        for res in &group.resources {
            if seen.insert(res.uri.clone()) {
                out.push(Resource::new(res.uri.clone(), res.kind));
            }
        }
    }
}
