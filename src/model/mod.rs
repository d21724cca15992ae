// src/model/mod.rs

//! The logical model: named groups of resources, and the cache keys derived
//! artifacts are stored under.
//!
//! Model snapshots are immutable; a [`ModelProvider`] hands out the current
//! one and the watcher only ever reads from it.

pub mod provider;

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{ReswatchError, Result};
use crate::types::ResourceType;

pub use provider::{FileModelProvider, ModelProvider, StaticModelProvider};

/// A single asset identified by its URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    uri: String,
    kind: ResourceType,
}

impl Resource {
    pub fn new(uri: impl Into<String>, kind: ResourceType) -> Self {
        Self {
            uri: uri.into(),
            kind,
        }
    }

    pub fn script(uri: impl Into<String>) -> Self {
        Self::new(uri, ResourceType::Script)
    }

    pub fn stylesheet(uri: impl Into<String>) -> Self {
        Self::new(uri, ResourceType::Stylesheet)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn kind(&self) -> ResourceType {
        self.kind
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.uri, self.kind)
    }
}

/// Named, ordered collection of resources forming one buildable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    resources: Vec<Resource>,
}

impl Group {
    pub fn new(name: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self {
            name: name.into(),
            resources,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

/// Snapshot of all groups known at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    groups: BTreeMap<String, Group>,
}

impl Model {
    pub fn new(groups: impl IntoIterator<Item = Group>) -> Self {
        Self {
            groups: groups
                .into_iter()
                .map(|g| (g.name.clone(), g))
                .collect(),
        }
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Result<&Group> {
        self.groups
            .get(name)
            .ok_or_else(|| ReswatchError::GroupNotFound(name.to_string()))
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }
}

/// Identifies a derived cache entry.
///
/// `resource_type = None` addresses every artifact built from the group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub group: String,
    pub resource_type: Option<ResourceType>,
}

impl CacheKey {
    pub fn new(group: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            group: group.into(),
            resource_type: Some(resource_type),
        }
    }

    pub fn for_group(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            resource_type: None,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_type {
            Some(kind) => write!(f, "{}.{}", self.group, kind),
            None => f.write_str(&self.group),
        }
    }
}
