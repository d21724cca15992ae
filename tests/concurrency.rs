mod common;
use crate::common::builders::{ModelBuilder, WatcherFixture};
use crate::common::init_tracing;

use std::thread;

use reswatch::model::{CacheKey, Resource};

const GROUPS: usize = 16;

fn group_name(i: usize) -> String {
    format!("g{i:02}")
}

/// Every group holds its own script plus a shared stylesheet.
fn shared_fixture() -> WatcherFixture {
    let mut builder = ModelBuilder::new();
    for i in 0..GROUPS {
        builder = builder.with_group(
            &group_name(i),
            vec![
                Resource::script(format!("js/{i}.js")),
                Resource::stylesheet("css/shared.css"),
            ],
        );
    }
    let fx = WatcherFixture::new(builder.build());
    for i in 0..GROUPS {
        fx.write(&format!("js/{i}.js"), &format!("var v = {i};"));
    }
    fx.write("css/shared.css", "body { color: red; }");
    fx
}

fn check_all_concurrently(fx: &WatcherFixture) {
    thread::scope(|s| {
        for i in 0..GROUPS {
            let watcher = &fx.watcher;
            s.spawn(move || watcher.check(&CacheKey::for_group(group_name(i))));
        }
    });
}

#[test]
fn concurrent_first_checks_build_one_consistent_baseline() {
    init_tracing();
    let fx = shared_fixture();

    check_all_concurrently(&fx);

    assert!(fx.cache.invalidated().is_empty());
    assert_eq!(fx.watcher.baseline().len(), GROUPS + 1);
    assert!(fx.watcher.baseline().contains("css/shared.css"));
}

#[test]
fn disjoint_edits_invalidate_every_group_exactly_once() {
    init_tracing();
    let fx = shared_fixture();
    check_all_concurrently(&fx);

    for i in 0..GROUPS {
        fx.write(&format!("js/{i}.js"), &format!("var v = {i}; // edited"));
    }
    check_all_concurrently(&fx);

    let mut invalidated = fx.cache.invalidated();
    invalidated.sort_by(|a, b| a.group().cmp(b.group()));
    let expected: Vec<CacheKey> = (0..GROUPS)
        .map(|i| CacheKey::for_group(group_name(i)))
        .collect();
    assert_eq!(invalidated, expected);
}

#[test]
fn shared_edit_is_seen_by_at_least_one_group_and_settles() {
    init_tracing();
    let fx = shared_fixture();
    check_all_concurrently(&fx);

    fx.write("css/shared.css", "body { color: blue; }");
    check_all_concurrently(&fx);

    // Groups racing on a shared resource may observe the new baseline
    // committed by a faster sibling.
    let first_round = fx.cache.invalidated().len();
    assert!((1..=GROUPS).contains(&first_round));

    check_all_concurrently(&fx);
    assert_eq!(fx.cache.invalidated().len(), first_round);
}

#[test]
fn concurrent_checks_after_a_single_edit_touch_only_that_group() {
    init_tracing();
    let fx = shared_fixture();
    check_all_concurrently(&fx);

    fx.write("js/7.js", "var v = 'seven';");
    check_all_concurrently(&fx);
    assert_eq!(fx.cache.invalidated(), vec![CacheKey::for_group("g07")]);

    check_all_concurrently(&fx);
    assert_eq!(fx.cache.invalidated().len(), 1);
}
