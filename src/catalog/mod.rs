//! Model metadata catalog.
//!
//! The catalog is built in memory from layered sources (packaged dataset,
//! configuration, host overrides) and published as an immutable [`Snapshot`].
//! Lookups never touch the network; refresh happens by building a new
//! snapshot and swapping it in.

pub mod engine;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod id;
pub mod index;
pub mod merge;
pub mod normalize;
pub mod options;
pub mod pattern;
pub mod snapshot;
pub mod source;
pub mod types;
pub mod validate;


pub use engine::CatalogBuilder;
pub use error::CatalogError;
pub use filter::FilterSet;
pub use id::{ProviderId, ProviderIdError};
pub use options::{ALLOW_ALL, AllowList, CatalogOptions, Overrides};
pub use pattern::Pattern;
pub use snapshot::{Snapshot, SnapshotMeta, packaged_document};
pub use source::{OverrideSource, SourceKind};
pub use types::{Capabilities, Cost, Limits, Modalities, Model, Provider, SnapshotDocument};
