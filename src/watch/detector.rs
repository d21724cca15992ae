// src/watch/detector.rs

//! Per-resource change detection, including the stylesheet import graph.

use std::collections::HashSet;
use std::io::Read;

use tracing::{debug, trace};

use crate::errors::{Result, ReswatchError};
use crate::hash::{Digest, HashProvider};
use crate::locator::ResourceLocator;
use crate::model::Resource;
use crate::types::ResourceType;
use crate::watch::baseline::HashBaseline;
use crate::watch::imports::{ScanOutcome, parse_imports, resolve_import};
use crate::watch::memo::HashMemo;

/// Borrowed view over the collaborators needed to decide whether one
/// resource changed. Cheap to build per cycle.
pub(crate) struct ChangeDetector<'a> {
    pub(crate) locator: &'a dyn ResourceLocator,
    pub(crate) hasher: &'a dyn HashProvider,
    pub(crate) baseline: &'a HashBaseline,
}

/// Import-graph bookkeeping for one `is_changed` call.
#[derive(Debug, Default)]
struct Traversal {
    /// Stylesheets on the current import path.
    on_path: HashSet<String>,
    /// Stylesheets whose import subgraph was fully scanned without a change.
    settled: HashSet<String>,
}

impl ChangeDetector<'_> {
    /// True if `resource`, or for stylesheets anything it transitively
    /// imports, differs from the baseline. Read failures count as unchanged.
    pub(crate) fn is_changed(&self, resource: &Resource, memo: &mut HashMemo) -> bool {
        let mut traversal = Traversal::default();
        self.check_resource(resource, memo, &mut traversal).is_changed()
    }

    /// Digest of `uri` for this cycle, reading and hashing it at most once.
    pub(crate) fn memoized_hash(&self, uri: &str, memo: &mut HashMemo) -> Result<Digest> {
        memo.get_or_try_insert_with::<ReswatchError>(uri, || {
            trace!(%uri, "hashing resource");
            let mut stream = self.locator.locate(uri)?;
            Ok(self.hasher.hash(&mut stream)?)
        })
    }

    fn check_resource(
        &self,
        resource: &Resource,
        memo: &mut HashMemo,
        traversal: &mut Traversal,
    ) -> ScanOutcome {
        let uri = resource.uri();
        if traversal.settled.contains(uri) {
            trace!(%uri, "import subgraph already scanned");
            return ScanOutcome::Unchanged;
        }
        debug!(%uri, "checking resource for change");

        let current = match self.memoized_hash(uri, memo) {
            Ok(digest) => digest,
            Err(err) => {
                debug!(
                    %uri,
                    "[FAIL] cannot check resource ({err}); assuming it is unchanged"
                );
                return ScanOutcome::Failed;
            }
        };

        // No baseline yet means first observation: nothing to compare with.
        if let Some(previous) = self.baseline.get(uri) {
            if previous != current {
                return ScanOutcome::Changed;
            }
        }

        if resource.kind() == ResourceType::Stylesheet {
            return self.scan_imports(uri, memo, traversal);
        }
        ScanOutcome::Unchanged
    }

    fn scan_imports(
        &self,
        uri: &str,
        memo: &mut HashMemo,
        traversal: &mut Traversal,
    ) -> ScanOutcome {
        if !traversal.on_path.insert(uri.to_string()) {
            debug!(%uri, "import cycle detected; not descending");
            return ScanOutcome::Unchanged;
        }
        let outcome = self.scan_imports_of(uri, memo, traversal);
        traversal.on_path.remove(uri);
        // A change anywhere ends the whole traversal, so any other outcome
        // holds for every later path reaching this stylesheet.
        if !outcome.is_changed() {
            traversal.settled.insert(uri.to_string());
        }
        outcome
    }

    fn scan_imports_of(
        &self,
        uri: &str,
        memo: &mut HashMemo,
        traversal: &mut Traversal,
    ) -> ScanOutcome {
        let content = match self.read_content(uri) {
            Ok(content) => content,
            Err(err) => {
                debug!(%uri, "[FAIL] cannot scan @import directives: {err}");
                return ScanOutcome::Failed;
            }
        };

        for import in parse_imports(&content) {
            let imported_uri = resolve_import(uri, &import);
            if traversal.on_path.contains(&imported_uri) {
                debug!(%uri, import = %imported_uri, "import cycle detected; skipping");
                continue;
            }

            debug!(%uri, import = %imported_uri, "found @import");
            let imported = Resource::stylesheet(imported_uri);
            match self.check_resource(&imported, memo, traversal) {
                ScanOutcome::Changed => {
                    debug!(%uri, import = %imported.uri(), "change detected through import");
                    return ScanOutcome::Changed;
                }
                ScanOutcome::Failed => {
                    debug!(import = %imported.uri(), "import could not be checked; continuing");
                }
                ScanOutcome::Unchanged => {}
            }
        }

        ScanOutcome::Unchanged
    }

    fn read_content(&self, uri: &str) -> Result<String> {
        let mut stream = self.locator.locate(uri)?;
        let mut content = String::new();
        stream.read_to_string(&mut content)?;
        Ok(content)
    }
}
