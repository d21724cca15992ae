// src/engine/ticker.rs

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use super::{CheckReason, RuntimeEvent};

/// Request a check cycle every `period`, starting one period from now.
///
/// Ticks missed while a cycle is running are skipped rather than bunched up.
/// The task ends once the runtime channel is closed.
pub fn spawn_ticker(period: Duration, runtime_tx: mpsc::Sender<RuntimeEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let event = RuntimeEvent::CheckRequested {
                reason: CheckReason::Timer,
            };
            if runtime_tx.send(event).await.is_err() {
                debug!("runtime channel closed; stopping ticker");
                break;
            }
        }
    })
}
