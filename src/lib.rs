// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod hash;
pub mod locator;
pub mod logging;
pub mod model;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cache::MemoryCacheStore;
use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::engine::{CheckReason, Runtime, RuntimeEvent, RuntimeOptions};
use crate::fs::RealFileSystem;
use crate::hash::Blake3HashProvider;
use crate::locator::FsResourceLocator;
use crate::model::{CacheKey, FileModelProvider};
use crate::types::HashStorageMode;
use crate::watch::{FileBaselineStorage, HashBaseline, LoggingListener, ResourceWatcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - model file loading
/// - locator / hash provider / cache store / baseline
/// - the resource watcher and its runtime
/// - periodic and (optional) filesystem triggers
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone();
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let keys = cache_keys(&cfg, args.group.as_deref())?;
    let watcher = Arc::new(build_watcher(&cfg, &config_path)?);

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let _ticker = (!args.once).then(|| engine::spawn_ticker(cfg.update_period(), rt_tx.clone()));

    let _fs_trigger = if !args.once && cfg.config().watch_filesystem {
        Some(engine::spawn_fs_trigger(cfg.base_dir(), rt_tx.clone())?)
    } else {
        None
    };

    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    info!(
        keys = keys.len(),
        period_secs = cfg.config().update_period_secs,
        "watching resource groups"
    );
    rt_tx
        .send(RuntimeEvent::CheckRequested {
            reason: CheckReason::Startup,
        })
        .await?;

    let options = RuntimeOptions {
        exit_after_first_cycle: args.once,
    };
    let runtime = Runtime::new(watcher, keys, rt_rx, options);
    runtime.run().await?;
    Ok(())
}

/// Build a watcher over the real filesystem for a loaded model file.
///
/// The model itself is re-read from `config_path` on every check.
pub fn build_watcher(cfg: &ConfigFile, config_path: &std::path::Path) -> Result<ResourceWatcher> {
    let base_dir = cfg.base_dir();

    let baseline = match cfg.config().hash_storage_mode {
        HashStorageMode::Memory => HashBaseline::new(),
        HashStorageMode::File => {
            let baseline = HashBaseline::with_storage(Box::new(FileBaselineStorage::new(&base_dir)))?;
            info!(entries = baseline.len(), "loaded persisted hash baseline");
            baseline
        }
    };

    let watcher = ResourceWatcher::new(
        Arc::new(FileModelProvider::new(config_path)),
        Arc::new(FsResourceLocator::new(Arc::new(RealFileSystem), base_dir)),
        Arc::new(Blake3HashProvider),
        Arc::new(MemoryCacheStore::new()),
    )
    .with_listener(Arc::new(LoggingListener))
    .with_baseline(Arc::new(baseline));

    Ok(watcher)
}

/// One cache key per group, or just the requested group.
pub fn cache_keys(cfg: &ConfigFile, only_group: Option<&str>) -> Result<Vec<CacheKey>> {
    match only_group {
        Some(name) => {
            if !cfg.groups().contains_key(name) {
                bail!("unknown group '{name}'");
            }
            Ok(vec![CacheKey::for_group(name)])
        }
        None => Ok(cfg.groups().keys().map(CacheKey::for_group).collect()),
    }
}

fn print_dry_run(cfg: &ConfigFile) {
    println!("reswatch dry-run");
    println!("  config.base_dir = {:?}", cfg.base_dir());
    println!("  config.update_period_secs = {}", cfg.config().update_period_secs);
    println!("  config.hash_storage_mode = {:?}", cfg.config().hash_storage_mode);
    println!("  config.watch_filesystem = {}", cfg.config().watch_filesystem);
    println!();

    let model = cfg.to_model();
    println!("groups ({}):", cfg.groups().len());
    for group in model.groups() {
        println!("  - {}", group.name());
        let refs = &cfg.groups()[group.name()].groups;
        if !refs.is_empty() {
            println!("      groups: {:?}", refs);
        }
        for resource in group.resources() {
            println!("      {:<4} {}", resource.kind().as_str(), resource.uri());
        }
    }

    debug!("dry-run complete (nothing checked)");
}
