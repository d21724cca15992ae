// src/watch/imports.rs

//! Discovery of `@import` directives in stylesheets.
//!
//! Only the imported URIs matter here; the stylesheet itself is never
//! rewritten.

use std::sync::LazyLock;

use regex::Regex;

/// Result of checking one node of the import graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Unchanged,
    Changed,
    /// The node could not be read or parsed. Counts as "no change found".
    Failed,
}

impl ScanOutcome {
    pub fn is_changed(self) -> bool {
        self == ScanOutcome::Changed
    }
}

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid comment regex"));

// @import url("a.css"); @import url('a.css'); @import url(a.css);
// @import "a.css"; @import 'a.css' screen;
// The at-rule keyword and `url(` are ASCII case-insensitive.
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)@import\s+(?:url\(\s*)?(?:"([^"]*)"|'([^']*)'|([^'"\s);][^\s);]*))"#,
    )
    .expect("valid import regex")
});

/// Imported URIs in document order, as written (unresolved).
///
/// Commented-out imports and empty URIs are skipped.
pub fn parse_imports(css: &str) -> Vec<String> {
    let without_comments = COMMENT_RE.replace_all(css, "");
    IMPORT_RE
        .captures_iter(&without_comments)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().trim().to_string())
        })
        .filter(|uri| !uri.is_empty())
        .collect()
}

/// Resolve `import` as written inside the stylesheet at `parent_uri`.
///
/// Relative imports are joined to the parent's directory and `.`/`..`
/// segments are collapsed. Root-relative and scheme URIs are returned as is.
/// Query strings and fragments are dropped.
pub fn resolve_import(parent_uri: &str, import: &str) -> String {
    let import = import
        .split(['?', '#'])
        .next()
        .unwrap_or(import);

    if import.starts_with('/') || import.contains("://") {
        return import.to_string();
    }

    let dir = match parent_uri.rfind('/') {
        Some(idx) => &parent_uri[..=idx],
        None => "",
    };

    normalize(&format!("{dir}{import}"))
}

fn normalize(uri: &str) -> String {
    let (scheme, path) = match uri.find("://") {
        Some(idx) => uri.split_at(idx + 3),
        None => ("", uri),
    };
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if absolute {
        format!("{scheme}/{joined}")
    } else {
        format!("{scheme}{joined}")
    }
}
