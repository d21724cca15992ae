// src/engine/mod.rs

//! Async shell around the [`ResourceWatcher`](crate::watch::ResourceWatcher).
//!
//! Check requests come from a periodic ticker, an optional filesystem
//! trigger and startup; the runtime turns each request into one check cycle
//! over every cache key.

pub mod fs_trigger;
pub mod runtime;
pub mod ticker;

/// Why a check cycle was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckReason {
    /// Initial cycle at startup.
    Startup,
    /// The update period elapsed.
    Timer,
    /// Something changed under the base directory.
    FileWatch,
}

/// Runtime options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Stop after the first cycle (used for `--once`).
    pub exit_after_first_cycle: bool,
}

/// Events flowing into the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    CheckRequested { reason: CheckReason },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub use fs_trigger::{FsTriggerHandle, is_relevant, spawn_fs_trigger};
pub use runtime::Runtime;
pub use ticker::spawn_ticker;
