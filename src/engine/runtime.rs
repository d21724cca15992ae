// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::model::CacheKey;
use crate::watch::ResourceWatcher;

use super::{CheckReason, RuntimeEvent, RuntimeOptions};

/// Turns check requests into check cycles.
///
/// A cycle checks every cache key concurrently, each on its own blocking
/// worker, and waits for all of them. Requests that pile up while a cycle
/// runs are coalesced into a single follow-up cycle.
pub struct Runtime {
    watcher: Arc<ResourceWatcher>,
    keys: Vec<CacheKey>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    options: RuntimeOptions,
    cycles: u64,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("keys", &self.keys)
            .field("options", &self.options)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

/// What was waiting in the channel after a cycle.
enum Pending {
    Nothing,
    Check(CheckReason),
    Shutdown,
}

impl Runtime {
    pub fn new(
        watcher: Arc<ResourceWatcher>,
        keys: Vec<CacheKey>,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            watcher,
            keys,
            event_rx,
            options,
            cycles: 0,
        }
    }

    /// Main event loop. Returns the number of cycles run.
    pub async fn run(mut self) -> Result<u64> {
        info!(keys = self.keys.len(), "reswatch runtime started");

        'events: loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                break;
            };
            debug!(?event, "runtime received event");

            let mut reason = match event {
                RuntimeEvent::CheckRequested { reason } => reason,
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested");
                    break;
                }
            };

            loop {
                self.run_cycle(reason).await;

                if self.options.exit_after_first_cycle {
                    info!("single cycle requested; stopping runtime");
                    break 'events;
                }

                match self.drain_pending() {
                    Pending::Nothing => break,
                    Pending::Check(next) => {
                        debug!(?next, "coalesced check requests received during cycle");
                        reason = next;
                    }
                    Pending::Shutdown => {
                        info!("shutdown requested");
                        break 'events;
                    }
                }
            }
        }

        info!(cycles = self.cycles, "runtime exiting");
        Ok(self.cycles)
    }

    async fn run_cycle(&mut self, reason: CheckReason) {
        let started = Instant::now();
        debug!(?reason, keys = self.keys.len(), "starting check cycle");

        let mut workers = JoinSet::new();
        for key in &self.keys {
            let watcher = Arc::clone(&self.watcher);
            let key = key.clone();
            workers.spawn_blocking(move || watcher.check(&key));
        }
        while let Some(res) = workers.join_next().await {
            if let Err(err) = res {
                error!("check worker failed: {err}");
            }
        }

        self.cycles += 1;
        debug!(
            ?reason,
            cycle = self.cycles,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "check cycle finished"
        );
    }

    fn drain_pending(&mut self) -> Pending {
        let mut pending = Pending::Nothing;
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                RuntimeEvent::ShutdownRequested => return Pending::Shutdown,
                RuntimeEvent::CheckRequested { reason } => pending = Pending::Check(reason),
            }
        }
        pending
    }
}
