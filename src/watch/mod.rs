// src/watch/mod.rs

//! Resource change detection.
//!
//! This module is responsible for:
//! - Hashing resources at most once per check cycle (`memo`).
//! - Comparing against the last confirmed digests (`baseline`, `storage`).
//! - Following stylesheet `@import` graphs (`imports`, `detector`).
//! - Orchestrating a check and invalidating the cache entry (`watcher`).
//!
//! It knows nothing about scheduling; callers decide when to `check`.

pub mod baseline;
mod detector;
pub mod imports;
pub mod listener;
pub mod memo;
pub mod storage;
pub mod watcher;

pub use baseline::HashBaseline;
pub use imports::{ScanOutcome, parse_imports, resolve_import};
pub use listener::{ChangeListener, LoggingListener, NoopListener};
pub use memo::HashMemo;
pub use storage::{BaselineStorage, FileBaselineStorage, HASH_FILE_PATH, STATE_DIR};
pub use watcher::ResourceWatcher;
