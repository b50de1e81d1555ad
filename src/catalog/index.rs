//! Lookup indexes over the filtered catalog.
//!
//! Index construction trusts its input: records are already deduplicated by
//! the merge, so collisions simply take the last write.

use super::id::ProviderId;
use super::types::{Model, Provider};
use std::collections::HashMap;

/// Positional indexes into a snapshot's provider and model lists.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    pub providers_by_id: HashMap<ProviderId, usize>,
    /// provider -> model id -> position.
    pub models_by_key: HashMap<ProviderId, HashMap<String, usize>>,
    /// provider -> positions in source order.
    pub models_by_provider: HashMap<ProviderId, Vec<usize>>,
    /// provider -> alias -> canonical model id.
    pub aliases_by_key: HashMap<ProviderId, HashMap<String, String>>,
}

#[must_use]
pub fn build_index(providers: &[Provider], models: &[Model]) -> CatalogIndex {
    let mut index = CatalogIndex::default();
    for (position, provider) in providers.iter().enumerate() {
        index.providers_by_id.insert(provider.id.clone(), position);
    }
    for (position, model) in models.iter().enumerate() {
        index
            .models_by_key
            .entry(model.provider.clone())
            .or_default()
            .insert(model.id.clone(), position);
        index
            .models_by_provider
            .entry(model.provider.clone())
            .or_default()
            .push(position);
        for alias in &model.aliases {
            index
                .aliases_by_key
                .entry(model.provider.clone())
                .or_default()
                .insert(alias.clone(), model.id.clone());
        }
    }
    index
}
