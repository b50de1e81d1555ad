//! Record sources feeding the build pipeline.

use serde_json::Value;
use std::collections::HashMap;

/// Origin of a layer of records, in ascending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceKind {
    Packaged,
    Config,
    Override,
}

impl SourceKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Packaged => "packaged",
            Self::Config => "config",
            Self::Override => "override",
        }
    }
}

/// Host-supplied records layered on top of the packaged and config
/// sources. All methods default to empty so implementors only override
/// what they provide.
pub trait OverrideSource: Send + Sync {
    fn providers(&self) -> Vec<Value> {
        Vec::new()
    }

    fn models(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Exclude patterns keyed by provider id, applied to every source.
    fn excludes(&self) -> HashMap<String, Vec<String>> {
        HashMap::new()
    }
}

/// One layer of raw records tagged with where it came from.
#[derive(Debug)]
pub(crate) struct SourceRecords {
    pub kind: SourceKind,
    pub providers: Vec<Value>,
    pub models: Vec<Value>,
}
