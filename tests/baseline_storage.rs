mod common;
use crate::common::fakes::RecordingCacheStore;
use crate::common::init_tracing;

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use reswatch::fs::RealFileSystem;
use reswatch::hash::Blake3HashProvider;
use reswatch::locator::FsResourceLocator;
use reswatch::model::{CacheKey, Group, Model, Resource, StaticModelProvider};
use reswatch::watch::{
    BaselineStorage, FileBaselineStorage, HASH_FILE_PATH, HashBaseline, HashMemo, ResourceWatcher,
};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn memo_computes_each_uri_once_and_skips_failures() {
    let mut memo = HashMemo::new();
    let mut computed = 0;

    let first: Result<String, String> = memo.get_or_try_insert_with("a.js", || {
        computed += 1;
        Ok("h1".to_string())
    });
    let second: Result<String, String> = memo.get_or_try_insert_with("a.js", || {
        computed += 1;
        Ok("h2".to_string())
    });
    assert_eq!(first.unwrap(), "h1");
    assert_eq!(second.unwrap(), "h1");
    assert_eq!(computed, 1);

    let failed: Result<String, String> =
        memo.get_or_try_insert_with("b.js", || Err("unreadable".to_string()));
    assert!(failed.is_err());
    assert!(memo.get("b.js").is_none());
    assert_eq!(memo.len(), 1);
}

#[test]
fn commit_adds_and_overwrites_but_never_removes() {
    let baseline = HashBaseline::new();

    let mut memo = HashMemo::new();
    memo.get_or_try_insert_with::<()>("a.js", || Ok("1".into())).unwrap();
    memo.get_or_try_insert_with::<()>("b.js", || Ok("1".into())).unwrap();
    assert_eq!(baseline.commit(memo), 2);

    let mut memo = HashMemo::new();
    memo.get_or_try_insert_with::<()>("a.js", || Ok("2".into())).unwrap();
    assert_eq!(baseline.commit(memo), 1);

    assert_eq!(baseline.get("a.js").as_deref(), Some("2"));
    assert_eq!(baseline.get("b.js").as_deref(), Some("1"));
    assert_eq!(baseline.len(), 2);
}

#[test]
fn file_storage_round_trips_uris_with_spaces() -> TestResult {
    let dir = tempdir()?;
    let storage = FileBaselineStorage::new(dir.path());

    let mut hashes = HashMap::new();
    hashes.insert("css/main.css".to_string(), "abc123".to_string());
    hashes.insert("js/my file.js".to_string(), "def456".to_string());
    storage.save(&hashes)?;

    assert!(dir.path().join(HASH_FILE_PATH).is_file());
    assert_eq!(storage.load()?, hashes);
    Ok(())
}

#[test]
fn missing_storage_file_loads_empty() -> TestResult {
    let dir = tempdir()?;
    let storage = FileBaselineStorage::new(dir.path());
    assert!(storage.load()?.is_empty());
    Ok(())
}

fn disk_watcher(
    root: &std::path::Path,
    resources: Vec<Resource>,
    cache: Arc<RecordingCacheStore>,
) -> anyhow::Result<ResourceWatcher> {
    let model = Model::new([Group::new("g", resources)]);
    let baseline = HashBaseline::with_storage(Box::new(FileBaselineStorage::new(root)))?;
    Ok(ResourceWatcher::new(
        Arc::new(StaticModelProvider::new(model)),
        Arc::new(FsResourceLocator::new(Arc::new(RealFileSystem), root)),
        Arc::new(Blake3HashProvider),
        cache,
    )
    .with_baseline(Arc::new(baseline)))
}

#[test]
fn persisted_baseline_detects_changes_made_while_not_running() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::write(dir.path().join("app.js"), "console.log(1);")?;
    let key = CacheKey::for_group("g");

    {
        let cache = Arc::new(RecordingCacheStore::default());
        let watcher = disk_watcher(dir.path(), vec![Resource::script("app.js")], cache.clone())?;
        watcher.check(&key);
        assert!(cache.invalidated().is_empty());
    }

    fs::write(dir.path().join("app.js"), "console.log(2);")?;

    let cache = Arc::new(RecordingCacheStore::default());
    let watcher = disk_watcher(dir.path(), vec![Resource::script("app.js")], cache.clone())?;
    assert_eq!(watcher.baseline().len(), 1);
    watcher.check(&key);
    assert_eq!(cache.invalidated(), vec![key]);

    Ok(())
}

#[test]
fn broad_wildcard_ignores_the_persisted_baseline_file() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::write(dir.path().join("a.js"), "var a;")?;
    let key = CacheKey::for_group("g");

    let cache = Arc::new(RecordingCacheStore::default());
    let watcher = disk_watcher(dir.path(), vec![Resource::script("**")], cache.clone())?;
    for _ in 0..5 {
        watcher.check(&key);
    }

    assert!(dir.path().join(HASH_FILE_PATH).is_file());
    assert!(cache.invalidated().is_empty());

    fs::write(dir.path().join("b.js"), "var b;")?;
    watcher.check(&key);
    assert_eq!(cache.invalidated(), vec![key]);
    Ok(())
}
