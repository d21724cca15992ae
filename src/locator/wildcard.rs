// src/locator/wildcard.rs

//! Wildcard URIs such as `css/*.css` or `js/**/*.js`.
//!
//! A wildcard resource stands for every matching file below the base
//! directory. Its stream is the concatenation of those files in path order,
//! so the digest changes when any of them is edited, added or removed.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::{Result, ReswatchError};
use crate::fs::FileSystem;
use crate::watch::STATE_DIR;

pub fn is_wildcard(uri: &str) -> bool {
    uri.contains(['*', '?', '['])
}

/// `*` stays within one directory level, `**` crosses directories.
fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid wildcard uri: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// All files under `root` whose root-relative path matches `pattern`,
/// sorted by path. The baseline state directory is never descended into.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    pattern: &str,
) -> Result<Vec<PathBuf>> {
    let matcher = compile(pattern)?;
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                if path.file_name().is_some_and(|name| name == STATE_DIR) {
                    continue;
                }
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if matcher.is_match(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

pub(crate) fn locate_matching(
    fs: &dyn FileSystem,
    root: &Path,
    uri: &str,
    pattern: &str,
) -> Result<Box<dyn Read + Send>> {
    if !fs.is_dir(root) {
        return Err(ReswatchError::ResourceNotFound(uri.to_string()));
    }

    let files = collect_matching_files(fs, root, pattern)?;
    if files.is_empty() {
        return Err(ReswatchError::ResourceNotFound(uri.to_string()));
    }
    debug!(%uri, matched = files.len(), "expanded wildcard resource");

    let mut stream: Box<dyn Read + Send> = Box::new(io::empty());
    for path in &files {
        stream = Box::new(stream.chain(fs.open_read(path)?));
    }
    Ok(stream)
}
