// src/engine/fs_trigger.rs

use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{CheckReason, RuntimeEvent};
use crate::watch::STATE_DIR;

/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops filesystem watching.
pub struct FsTriggerHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for FsTriggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsTriggerHandle").finish()
    }
}

/// Watch `root` recursively and request a check cycle whenever something
/// below it is created, modified or removed.
///
/// Events for the baseline file under `.reswatch/` are ignored, otherwise
/// every persisted commit would trigger another cycle.
pub fn spawn_fs_trigger(
    root: impl Into<PathBuf>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<FsTriggerHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    // Called synchronously by notify on its own thread.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                // Receiver gone means the runtime is shutting down.
                let _ = event_tx.send(event);
            }
            Err(err) => {
                eprintln!("reswatch: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !is_relevant(&event) {
                continue;
            }
            debug!(paths = ?event.paths, "filesystem change; requesting check");
            let request = RuntimeEvent::CheckRequested {
                reason: CheckReason::FileWatch,
            };
            if let Err(err) = runtime_tx.send(request).await {
                warn!("failed to send RuntimeEvent::CheckRequested: {err}");
                break;
            }
        }
        debug!("file watcher event loop finished");
    });

    Ok(FsTriggerHandle { _inner: watcher })
}

/// Whether `event` should trigger a check: a create, modify or remove
/// touching at least one path outside the state directory.
pub fn is_relevant(event: &Event) -> bool {
    let kind_matters = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    kind_matters && event.paths.iter().any(|p| !is_internal_path(p))
}

fn is_internal_path(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == STATE_DIR))
}
