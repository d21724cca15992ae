mod common;
use crate::common::builders::{ModelBuilder, WatcherFixture};
use crate::common::fakes::{
    FailingLocator, FailingModelProvider, PanickingListener, RecordingCacheStore,
};
use crate::common::init_tracing;

use std::sync::Arc;

use reswatch::fs::mock::MockFileSystem;
use reswatch::hash::{Blake3HashProvider, hash_bytes};
use reswatch::locator::FsResourceLocator;
use reswatch::model::{CacheKey, Model, Resource, StaticModelProvider};
use reswatch::watch::{HashMemo, ResourceWatcher};

fn digest(content: &str) -> String {
    hash_bytes(&Blake3HashProvider, content.as_bytes()).unwrap()
}

fn single_script_group() -> WatcherFixture {
    let model = ModelBuilder::new()
        .with_group("g1", vec![Resource::script("a.js")])
        .build();
    WatcherFixture::new(model)
}

#[test]
fn first_check_records_baseline_without_invalidating() {
    init_tracing();
    let fx = single_script_group();
    fx.write("a.js", "var a = 1;");

    let key = CacheKey::for_group("g1");
    fx.watcher.check(&key);

    assert!(fx.listener.changed_resources().is_empty());
    assert!(fx.listener.changed_groups().is_empty());
    assert!(fx.cache.invalidated().is_empty());
    assert_eq!(fx.watcher.baseline().get("a.js"), Some(digest("var a = 1;")));
}

#[test]
fn edited_script_invalidates_its_group() {
    init_tracing();
    let fx = single_script_group();
    fx.write("a.js", "var a = 1;");
    let key = CacheKey::for_group("g1");
    fx.watcher.check(&key);

    fx.write("a.js", "var a = 2;");
    fx.watcher.check(&key);

    assert_eq!(fx.listener.changed_resources(), vec!["a.js".to_string()]);
    assert_eq!(fx.listener.changed_groups(), vec![key.clone()]);
    assert_eq!(fx.cache.invalidated(), vec![key]);
    assert_eq!(fx.watcher.baseline().get("a.js"), Some(digest("var a = 2;")));
}

#[test]
fn repeated_checks_without_edits_are_idempotent() {
    init_tracing();
    let fx = single_script_group();
    fx.write("a.js", "var a = 1;");
    let key = CacheKey::for_group("g1");

    fx.watcher.check(&key);
    fx.watcher.check(&key);
    fx.watcher.check(&key);
    assert!(fx.listener.changed_groups().is_empty());

    // One edit is reported exactly once, not on every later check.
    fx.write("a.js", "var a = 2;");
    fx.watcher.check(&key);
    fx.watcher.check(&key);
    assert_eq!(fx.listener.changed_groups().len(), 1);
    assert_eq!(fx.cache.invalidated().len(), 1);
}

#[test]
fn only_the_first_changed_resource_triggers_invalidation() {
    init_tracing();
    let model = ModelBuilder::new()
        .with_group(
            "g",
            vec![
                Resource::script("r1.js"),
                Resource::script("r2.js"),
                Resource::script("r3.js"),
            ],
        )
        .build();
    let fx = WatcherFixture::new(model);
    fx.write("r1.js", "1");
    fx.write("r2.js", "2");
    fx.write("r3.js", "3");
    let key = CacheKey::for_group("g");
    fx.watcher.check(&key);

    fx.write("r2.js", "2 edited");
    fx.write("r3.js", "3 edited");
    fx.watcher.check(&key);

    assert_eq!(fx.listener.changed_resources(), vec!["r2.js".to_string()]);
    assert_eq!(fx.listener.changed_groups(), vec![key.clone()]);
    assert_eq!(fx.cache.invalidated().len(), 1);

    // r3 was not examined after r2 triggered, so its baseline is stale and
    // the edit surfaces on the next cycle.
    assert_eq!(fx.watcher.baseline().get("r3.js"), Some(digest("3")));
    fx.watcher.check(&key);
    assert_eq!(
        fx.listener.changed_resources(),
        vec!["r2.js".to_string(), "r3.js".to_string()]
    );
}

#[test]
fn resource_never_seen_before_is_not_a_change() {
    init_tracing();
    let fx = single_script_group();
    fx.write("a.js", "anything at all");

    let mut memo = HashMemo::new();
    assert!(!fx.watcher.is_changed(&Resource::script("a.js"), &mut memo));
    assert_eq!(memo.get("a.js"), Some(&digest("anything at all")));
    assert!(fx.watcher.baseline().is_empty());
}

#[test]
fn unreadable_resource_is_reported_unchanged() {
    init_tracing();
    let model = ModelBuilder::new()
        .with_group("g", vec![Resource::script("gone.js"), Resource::script("b.js")])
        .build();
    let fx = WatcherFixture::new(model);
    fx.write("gone.js", "1");
    fx.write("b.js", "1");
    let key = CacheKey::for_group("g");
    fx.watcher.check(&key);

    fx.remove("gone.js");
    let mut memo = HashMemo::new();
    assert!(!fx.watcher.is_changed(&Resource::script("gone.js"), &mut memo));

    // The missing resource is skipped and the rest of the group is still examined.
    fx.write("b.js", "2");
    fx.watcher.check(&key);
    assert_eq!(fx.listener.changed_resources(), vec!["b.js".to_string()]);
    // Last confirmed digest of the missing resource is kept.
    assert_eq!(fx.watcher.baseline().get("gone.js"), Some(digest("1")));
}

#[test]
fn failing_locator_never_reaches_the_caller() {
    init_tracing();
    let model = ModelBuilder::new()
        .with_group("g", vec![Resource::script("a.js"), Resource::stylesheet("b.css")])
        .build();
    let fx = WatcherFixture::with_parts(
        MockFileSystem::new(),
        Arc::new(StaticModelProvider::new(model)),
        Arc::new(FailingLocator),
        Arc::new(Blake3HashProvider),
    );

    let key = CacheKey::for_group("g");
    fx.watcher.check(&key);
    fx.watcher.check(&key);

    assert!(fx.listener.changed_groups().is_empty());
    assert!(fx.cache.invalidated().is_empty());
    assert!(fx.watcher.baseline().is_empty());
}

#[test]
fn unknown_group_ends_the_cycle_quietly() {
    init_tracing();
    let fx = single_script_group();
    fx.write("a.js", "1");

    fx.watcher.check(&CacheKey::for_group("does-not-exist"));

    assert!(fx.cache.invalidated().is_empty());
    assert!(fx.watcher.baseline().is_empty());
}

#[test]
fn failing_model_provider_ends_the_cycle_quietly() {
    init_tracing();
    let fs = MockFileSystem::new();
    let fx = WatcherFixture::with_parts(
        fs.clone(),
        Arc::new(FailingModelProvider),
        Arc::new(FsResourceLocator::new(Arc::new(fs), "/web")),
        Arc::new(Blake3HashProvider),
    );

    fx.watcher.check(&CacheKey::for_group("g1"));

    assert!(fx.cache.invalidated().is_empty());
    assert!(fx.watcher.baseline().is_empty());
}

fn watcher_with(
    fs: &MockFileSystem,
    model: Model,
    cache: Arc<RecordingCacheStore>,
    listener: Arc<dyn reswatch::watch::ChangeListener>,
) -> ResourceWatcher {
    ResourceWatcher::new(
        Arc::new(StaticModelProvider::new(model)),
        Arc::new(FsResourceLocator::new(Arc::new(fs.clone()), "/web")),
        Arc::new(Blake3HashProvider),
        cache,
    )
    .with_listener(listener)
}

#[test]
fn panicking_listener_is_contained_and_cycle_is_not_committed() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/web/a.js", "1");
    let model = ModelBuilder::new()
        .with_group("g", vec![Resource::script("a.js")])
        .build();
    let cache = Arc::new(RecordingCacheStore::default());
    let watcher = watcher_with(&fs, model, Arc::clone(&cache), Arc::new(PanickingListener));
    let key = CacheKey::for_group("g");

    watcher.check(&key);
    fs.add_file("/web/a.js", "2");
    watcher.check(&key);

    // The hook panicked before the cache write; the aborted cycle leaves the
    // baseline untouched so the change is still pending.
    assert!(cache.invalidated().is_empty());
    assert_eq!(watcher.baseline().get("a.js"), Some(digest("1")));
}

#[test]
fn failed_invalidation_is_retried_on_the_next_cycle() {
    init_tracing();
    let model = ModelBuilder::new()
        .with_group("g", vec![Resource::script("a.js")])
        .build();
    let fs = MockFileSystem::new();
    fs.add_file("/web/a.js", "1");
    let cache = Arc::new(RecordingCacheStore::failing());
    let listener = Arc::new(crate::common::fakes::RecordingListener::default());
    let watcher = watcher_with(&fs, model, cache, listener.clone());
    let key = CacheKey::for_group("g");

    watcher.check(&key);
    fs.add_file("/web/a.js", "2");
    watcher.check(&key);
    watcher.check(&key);

    assert_eq!(listener.changed_groups(), vec![key.clone(), key]);
    assert_eq!(watcher.baseline().get("a.js"), Some(digest("1")));
}
