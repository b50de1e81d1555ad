//! Build pipeline errors.

use super::pattern::PatternError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog source '{name}': {source}")]
    Source {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog source '{name}' is not valid JSON: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// An override source handed the pipeline a non-object record. Override
    /// sources are code, so this aborts the build instead of being dropped
    /// like bad data records.
    #[error("override source returned a non-object {0} record")]
    InvalidOverride(&'static str),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("allow list must be \":all\" or a provider-to-patterns map, got \"{0}\"")]
    InvalidAllowList(String),

    #[error("catalog build produced no usable {0}")]
    EmptyCatalog(&'static str),
}
