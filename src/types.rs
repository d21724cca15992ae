use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Kind of asset a resource represents.
///
/// Only stylesheets can import other resources, so the change detector
/// descends into the import graph for `Stylesheet` resources only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "js", alias = "script")]
    Script,
    #[serde(rename = "css", alias = "stylesheet")]
    Stylesheet,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Script => "js",
            ResourceType::Stylesheet => "css",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "js" | "script" => Ok(ResourceType::Script),
            "css" | "stylesheet" => Ok(ResourceType::Stylesheet),
            other => Err(format!(
                "invalid resource type: {other} (expected \"js\" or \"css\")"
            )),
        }
    }
}

/// Where the hash baseline lives between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashStorageMode {
    /// Keep the baseline in memory only (lost on restart).
    #[default]
    Memory,
    /// Persist the baseline to `.reswatch/hashes` under the base directory.
    File,
}
