// src/locator/mod.rs

//! Resolving resource URIs to byte streams.

pub mod wildcard;

use std::fmt::Debug;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::errors::{Result, ReswatchError};
use crate::fs::FileSystem;

/// Turns a resource URI into a readable stream.
pub trait ResourceLocator: Send + Sync + Debug {
    /// Fails with `ResourceNotFound` when nothing exists at `uri`.
    fn locate(&self, uri: &str) -> Result<Box<dyn Read + Send>>;
}

/// Resolves URIs as paths below a base directory.
///
/// - `a/b.css`, `/a/b.css` and `file:a/b.css` all map to `<base>/a/b.css`.
/// - URIs containing glob metacharacters are expanded, see [`wildcard`].
/// - Any other scheme (`http://`, `//cdn/...`) is rejected.
#[derive(Debug, Clone)]
pub struct FsResourceLocator {
    fs: Arc<dyn FileSystem>,
    base_dir: PathBuf,
}

impl FsResourceLocator {
    pub fn new(fs: Arc<dyn FileSystem>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of `uri` relative to the base directory, with any supported
    /// scheme and leading slashes removed.
    fn relative_path<'a>(&self, uri: &'a str) -> Result<&'a str> {
        let stripped = uri
            .strip_prefix("file://")
            .or_else(|| uri.strip_prefix("file:"))
            .unwrap_or(uri);

        if stripped.contains("://") || stripped.starts_with("//") {
            return Err(ReswatchError::UnsupportedUri(uri.to_string()));
        }

        Ok(stripped.trim_start_matches('/'))
    }
}

impl ResourceLocator for FsResourceLocator {
    fn locate(&self, uri: &str) -> Result<Box<dyn Read + Send>> {
        let rel = self.relative_path(uri)?;

        if wildcard::is_wildcard(rel) {
            return wildcard::locate_matching(self.fs.as_ref(), &self.base_dir, uri, rel);
        }

        let path = self.base_dir.join(rel);
        trace!(%uri, ?path, "locating resource");
        if !self.fs.is_file(&path) {
            return Err(ReswatchError::ResourceNotFound(uri.to_string()));
        }
        Ok(self.fs.open_read(&path)?)
    }
}
