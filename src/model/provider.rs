// src/model/provider.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tracing::debug;

use crate::config::load_and_validate;
use crate::errors::Result;
use crate::model::Model;

/// Source of the current model snapshot.
pub trait ModelProvider: Send + Sync + Debug {
    fn current_model(&self) -> Result<Arc<Model>>;
}

/// Always returns the same snapshot.
#[derive(Debug, Clone)]
pub struct StaticModelProvider {
    model: Arc<Model>,
}

impl StaticModelProvider {
    pub fn new(model: Model) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

impl ModelProvider for StaticModelProvider {
    fn current_model(&self) -> Result<Arc<Model>> {
        Ok(Arc::clone(&self.model))
    }
}

/// Loads the model file and reloads it whenever its modification time or
/// size changes, so edits to group definitions take effect on the next
/// check without re-parsing the file for every group.
#[derive(Debug)]
pub struct FileModelProvider {
    path: PathBuf,
    loaded: Mutex<Option<LoadedModel>>,
}

#[derive(Debug)]
struct LoadedModel {
    stamp: FileStamp,
    model: Arc<Model>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

impl FileModelProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when the platform reports no modification time.
    fn stamp(&self) -> Result<Option<FileStamp>> {
        let meta = fs::metadata(&self.path)?;
        Ok(meta.modified().ok().map(|modified| FileStamp {
            modified,
            len: meta.len(),
        }))
    }
}

impl ModelProvider for FileModelProvider {
    fn current_model(&self) -> Result<Arc<Model>> {
        let stamp = self.stamp()?;
        let mut loaded = self
            .loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let (Some(stamp), Some(current)) = (stamp, loaded.as_ref()) {
            if current.stamp == stamp {
                return Ok(Arc::clone(&current.model));
            }
        }

        debug!(path = ?self.path, "loading model");
        let model = Arc::new(load_and_validate(&self.path)?.to_model());
        *loaded = stamp.map(|stamp| LoadedModel {
            stamp,
            model: Arc::clone(&model),
        });
        Ok(model)
    }
}
