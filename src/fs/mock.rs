// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // child names
}

/// In-memory filesystem. Clones share the same entries, so a test can keep a
/// handle and edit resources between check cycles.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    reads: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            reads: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create or overwrite a file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), MockEntry::File(content.into()));

        if let Some(parent) = path.parent() {
            let parent = normalize_parent(parent);
            ensure_dir_entry(&mut files, parent);
            add_child(&mut files, parent, &path);
        }
    }

    /// Remove a file; later opens fail as if it was deleted on disk.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.files.lock().unwrap();
        if files.remove(path).is_none() {
            return;
        }
        if let Some(parent) = path.parent() {
            let parent = normalize_parent(parent);
            if let (Some(MockEntry::Dir(children)), Some(name)) = (
                files.get_mut(parent),
                path.file_name().and_then(|n| n.to_str()),
            ) {
                children.retain(|c| c != name);
            }
        }
    }

    /// How many times `path` was opened for reading.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        let reads = self.reads.lock().unwrap();
        reads.get(path.as_ref()).copied().unwrap_or(0)
    }
}

fn normalize_parent(parent: &Path) -> &Path {
    if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }
}

fn add_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
    if let (Some(MockEntry::Dir(children)), Some(name)) = (
        files.get_mut(parent),
        path.file_name().and_then(|n| n.to_str()),
    ) {
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
}

fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if files.contains_key(path) {
        return;
    }
    files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        let parent = normalize_parent(parent);
        // Avoid looping at the root.
        if parent != path {
            ensure_dir_entry(files, parent);
            add_child(files, parent, path);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File(content)) => {
                *self
                    .reads
                    .lock()
                    .unwrap()
                    .entry(path.to_path_buf())
                    .or_default() += 1;
                Ok(Box::new(Cursor::new(content.clone())))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
