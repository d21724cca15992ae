// src/watch/storage.rs

//! Persistence of the hash baseline between process runs.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::hash::Digest;

/// Directory below the base directory holding reswatch's own state.
pub const STATE_DIR: &str = ".reswatch";

/// Relative path (from the base directory) to the baseline file.
pub const HASH_FILE_PATH: &str = ".reswatch/hashes";

pub trait BaselineStorage: Send + Sync + Debug {
    fn load(&self) -> Result<HashMap<String, Digest>>;
    fn save(&self, hashes: &HashMap<String, Digest>) -> Result<()>;
}

/// Stores the baseline as `<uri> <digest>` lines in `<root>/.reswatch/hashes`.
#[derive(Debug, Clone)]
pub struct FileBaselineStorage {
    root: PathBuf,
}

impl FileBaselineStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        hash_file_path(&self.root)
    }
}

fn hash_file_path(root: &Path) -> PathBuf {
    root.join(HASH_FILE_PATH)
}

impl BaselineStorage for FileBaselineStorage {
    fn load(&self) -> Result<HashMap<String, Digest>> {
        let path = self.path();

        if !path.exists() {
            return Ok(HashMap::new());
        }

        let file = File::open(&path)
            .with_context(|| format!("opening hash file at {:?}", path))?;
        let reader = BufReader::new(file);

        let mut map = HashMap::new();

        for line_res in reader.lines() {
            let line = line_res?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            // URIs may contain spaces; the digest never does.
            if let Some((uri, digest)) = trimmed.rsplit_once(char::is_whitespace) {
                map.insert(uri.trim_end().to_string(), digest.to_string());
            }
        }

        debug!(entries = map.len(), ?path, "loaded hash baseline");
        Ok(map)
    }

    fn save(&self, hashes: &HashMap<String, Digest>) -> Result<()> {
        let path = self.path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("creating hash directory at {:?}", parent)
            })?;
        }

        let file = File::create(&path)
            .with_context(|| format!("creating hash file at {:?}", path))?;
        let mut writer = BufWriter::new(file);

        let mut entries: Vec<_> = hashes.iter().collect();
        entries.sort();
        for (uri, digest) in entries {
            writeln!(writer, "{} {}", uri, digest)?;
        }

        writer.flush()?;
        Ok(())
    }
}
