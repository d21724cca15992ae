mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Read;
use std::sync::Arc;

use reswatch::errors::ReswatchError;
use reswatch::fs::mock::MockFileSystem;
use reswatch::hash::{Blake3HashProvider, HashProvider, hash_bytes};
use reswatch::locator::wildcard::collect_matching_files;
use reswatch::locator::{FsResourceLocator, ResourceLocator};

type TestResult = Result<(), Box<dyn Error>>;

fn read_all(locator: &dyn ResourceLocator, uri: &str) -> Result<String, ReswatchError> {
    let mut stream = locator.locate(uri)?;
    let mut out = String::new();
    stream.read_to_string(&mut out)?;
    Ok(out)
}

fn web_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/web/js/app.js", "app;");
    fs.add_file("/web/js/vendor/lib.js", "lib;");
    fs.add_file("/web/css/a.css", "a{}");
    fs.add_file("/web/css/b.css", "b{}");
    fs
}

#[test]
fn blake3_digest_is_stable() -> TestResult {
    let digest = hash_bytes(&Blake3HashProvider, b"hello world")?;
    assert_eq!(
        digest,
        "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
    );
    Ok(())
}

#[test]
fn uris_resolve_below_the_base_directory() -> TestResult {
    init_tracing();
    let locator = FsResourceLocator::new(Arc::new(web_fs()), "/web");

    assert_eq!(read_all(&locator, "js/app.js")?, "app;");
    assert_eq!(read_all(&locator, "/js/app.js")?, "app;");
    assert_eq!(read_all(&locator, "file:js/app.js")?, "app;");
    assert_eq!(read_all(&locator, "file:///js/app.js")?, "app;");
    Ok(())
}

#[test]
fn missing_resource_is_not_found() {
    let locator = FsResourceLocator::new(Arc::new(web_fs()), "/web");

    match locator.locate("js/missing.js") {
        Err(ReswatchError::ResourceNotFound(uri)) => assert_eq!(uri, "js/missing.js"),
        Err(e) => panic!("Expected ResourceNotFound, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn remote_uris_are_unsupported() {
    let locator = FsResourceLocator::new(Arc::new(web_fs()), "/web");

    for uri in ["http://cdn.example.com/x.css", "//cdn.example.com/x.css"] {
        assert!(matches!(
            locator.locate(uri),
            Err(ReswatchError::UnsupportedUri(_))
        ));
    }
}

#[test]
fn wildcard_concatenates_matches_in_path_order() -> TestResult {
    init_tracing();
    let locator = FsResourceLocator::new(Arc::new(web_fs()), "/web");

    assert_eq!(read_all(&locator, "css/*.css")?, "a{}b{}");
    Ok(())
}

#[test]
fn single_star_stays_in_one_directory() -> TestResult {
    let fs = web_fs();
    let root = std::path::Path::new("/web");

    let shallow = collect_matching_files(&fs, root, "js/*.js")?;
    assert_eq!(shallow, vec![root.join("js/app.js")]);

    let deep = collect_matching_files(&fs, root, "js/**/*.js")?;
    assert_eq!(deep, vec![root.join("js/app.js"), root.join("js/vendor/lib.js")]);
    Ok(())
}

#[test]
fn wildcard_walk_skips_the_state_directory() -> TestResult {
    let fs = web_fs();
    fs.add_file("/web/.reswatch/hashes", "js/app.js abc");
    fs.add_file("/web/css/.reswatch/hashes", "css/a.css def");
    let root = std::path::Path::new("/web");

    let all = collect_matching_files(&fs, root, "**")?;
    assert_eq!(all.len(), 4);
    assert!(all.iter().all(|p| !p.to_string_lossy().contains(".reswatch")));
    Ok(())
}

#[test]
fn wildcard_without_matches_is_not_found() {
    let locator = FsResourceLocator::new(Arc::new(web_fs()), "/web");
    assert!(matches!(
        locator.locate("less/*.less"),
        Err(ReswatchError::ResourceNotFound(_))
    ));
}

fn hash_uri(locator: &dyn ResourceLocator, uri: &str) -> Result<String, ReswatchError> {
    let mut stream = locator.locate(uri)?;
    Ok(Blake3HashProvider.hash(&mut stream)?)
}

#[test]
fn wildcard_digest_tracks_added_files() -> TestResult {
    let fs = web_fs();
    let locator = FsResourceLocator::new(Arc::new(fs.clone()), "/web");

    let before = hash_uri(&locator, "css/*.css")?;
    fs.add_file("/web/css/c.css", "c{}");
    let after = hash_uri(&locator, "css/*.css")?;

    assert_ne!(before, after);
    Ok(())
}
