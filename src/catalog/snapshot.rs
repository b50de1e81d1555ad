//! Immutable catalog snapshots.

use super::filter::FilterSet;
use super::id::ProviderId;
use super::index::{CatalogIndex, build_index};
use super::types::{Model, Provider, SnapshotDocument};
use chrono::{DateTime, Utc};
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct SnapshotMeta {
    pub built_at: DateTime<Utc>,
    /// Assigned by the store on publish; 0 until then.
    pub epoch: u64,
}

/// One fully built catalog. Snapshots are immutable after construction;
/// reload replaces the whole snapshot rather than mutating it.
#[derive(Debug)]
pub struct Snapshot {
    pub providers: Vec<Provider>,
    pub models: Vec<Model>,
    pub filters: FilterSet,
    pub prefer: Vec<ProviderId>,
    pub meta: SnapshotMeta,
    index: CatalogIndex,
}

impl Snapshot {
    pub(crate) fn assemble(
        providers: Vec<Provider>,
        models: Vec<Model>,
        filters: FilterSet,
        prefer: Vec<ProviderId>,
    ) -> Self {
        let index = build_index(&providers, &models);
        Self {
            providers,
            models,
            filters,
            prefer,
            meta: SnapshotMeta {
                built_at: Utc::now(),
                epoch: 0,
            },
            index,
        }
    }

    #[must_use]
    pub fn provider(&self, id: &str) -> Option<&Provider> {
        let position = *self.index.providers_by_id.get(id)?;
        self.providers.get(position)
    }

    #[must_use]
    pub fn has_provider(&self, id: &str) -> bool {
        self.index.providers_by_id.contains_key(id)
    }

    #[must_use]
    pub fn model(&self, provider: &str, id: &str) -> Option<&Model> {
        let position = *self.index.models_by_key.get(provider)?.get(id)?;
        self.models.get(position)
    }

    /// Models of one provider in source order.
    #[must_use]
    pub fn models_for(&self, provider: &str) -> Vec<&Model> {
        self.index
            .models_by_provider
            .get(provider)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&position| self.models.get(position))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Canonical model id behind an alias, if the alias is known.
    #[must_use]
    pub fn resolve_alias(&self, provider: &str, alias: &str) -> Option<&str> {
        self.index
            .aliases_by_key
            .get(provider)?
            .get(alias)
            .map(String::as_str)
    }
}

static PACKAGED: OnceLock<SnapshotDocument> = OnceLock::new();

/// The dataset compiled into the binary, used as the lowest-precedence
/// source when no other base document is configured.
pub fn packaged_document() -> &'static SnapshotDocument {
    PACKAGED.get_or_init(|| {
        serde_json::from_str(include_str!("../../data/models.json"))
            .expect("data/models.json must be valid")
    })
}
