//! Build options supplied by configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Allow-list sentinel admitting every provider.
pub const ALLOW_ALL: &str = ":all";

/// Which models pass the allow stage.
///
/// The semantics are asymmetric on purpose: an empty per-provider map means
/// "no restriction", while a non-empty map admits only models of the
/// providers it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowList {
    /// The `":all"` sentinel.
    Sentinel(String),
    /// Provider name to model-id globs.
    PerProvider(HashMap<String, Vec<String>>),
}

impl Default for AllowList {
    fn default() -> Self {
        Self::PerProvider(HashMap::new())
    }
}

impl AllowList {
    #[must_use]
    pub fn all() -> Self {
        Self::Sentinel(ALLOW_ALL.to_string())
    }
}

/// Record-level overrides merged above the packaged dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    /// Provider records; deep-merged over packaged records with the same id.
    pub providers: Vec<Value>,
    /// Model records; deep-merged over packaged records with the same
    /// (provider, id).
    pub models: Vec<Value>,
    /// Provider name to model-id globs dropped from the config and packaged
    /// sources before merging. An override source can still reintroduce a
    /// model listed here.
    pub exclude: HashMap<String, Vec<String>>,
}

/// Everything the build pipeline takes from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    pub overrides: Overrides,
    pub allow: AllowList,
    /// Provider name to model-id globs excluded after the allow stage.
    /// Deny always wins over allow.
    pub deny: HashMap<String, Vec<String>>,
    /// Providers tried first during capability selection, in order.
    pub prefer: Vec<String>,
    /// Base document replacing the packaged dataset, typically installed by
    /// `lodestar activate`.
    pub snapshot_path: Option<PathBuf>,
}
