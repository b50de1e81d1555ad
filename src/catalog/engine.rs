//! Catalog build pipeline.
//!
//! A build runs fixed stages in order: ingest, normalize, validate, merge,
//! enrich, filter, index, viability check. Bad data records are dropped and
//! counted; structural problems (unreadable source, non-object override
//! records, a malformed allow list) abort the whole build.

use super::enrich::enrich_models;
use super::error::CatalogError;
use super::filter::FilterSet;
use super::id::ProviderId;
use super::merge::{ExcludeSet, merge_models, merge_providers};
use super::normalize::{normalize_model, normalize_provider};
use super::options::CatalogOptions;
use super::snapshot::{Snapshot, packaged_document};
use super::source::{OverrideSource, SourceKind, SourceRecords};
use super::types::{Model, Provider, SnapshotDocument};
use super::validate::{validate_models, validate_providers};
use crate::store::CatalogStore;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Assembles a [`Snapshot`] from the packaged dataset, configuration, and an
/// optional host override source.
pub struct CatalogBuilder {
    options: CatalogOptions,
    override_source: Option<Box<dyn OverrideSource>>,
    base: Option<SnapshotDocument>,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new(options: CatalogOptions) -> Self {
        Self {
            options,
            override_source: None,
            base: None,
        }
    }

    /// Layer host-supplied records above the packaged and config sources.
    #[must_use]
    pub fn with_override_source(mut self, source: impl OverrideSource + 'static) -> Self {
        self.override_source = Some(Box::new(source));
        self
    }

    /// Use an explicit base document instead of the packaged dataset or the
    /// configured snapshot path.
    #[must_use]
    pub fn with_base_document(mut self, document: SnapshotDocument) -> Self {
        self.base = Some(document);
        self
    }

    pub fn build(&self) -> Result<Snapshot, CatalogError> {
        let sources = validate_sources(normalize_sources(self.ingest()?));

        // Providers merge first: the pre-merge model excludes draw on the
        // merged providers' own exclude lists.
        let provider_layers: Vec<Vec<Value>> = sources
            .iter()
            .map(|source| source.providers.clone())
            .collect();
        let providers: Vec<Provider> =
            materialize(merge_providers(&provider_layers), "provider");

        let source_excludes = self
            .override_source
            .as_ref()
            .map(|source| source.excludes())
            .unwrap_or_default();
        let excludes =
            ExcludeSet::build(&providers, &self.options.overrides.exclude, &source_excludes)?;

        let model_layers: Vec<(SourceKind, Vec<Value>)> = sources
            .into_iter()
            .map(|source| (source.kind, source.models))
            .collect();
        let mut models: Vec<Model> =
            materialize(merge_models(&model_layers, &excludes), "model");
        enrich_models(&mut models);

        let filters = FilterSet::build(&self.options.allow, &self.options.deny)?;
        models.retain(|model| filters.admits(model.provider.as_str(), &model.id));

        drop_orphans(&providers, &mut models);
        strip_shadowed_aliases(&mut models);

        let prefer = parse_prefer(&self.options.prefer);
        let snapshot = Snapshot::assemble(providers, models, filters, prefer);
        ensure_viable(&snapshot)?;
        debug!(
            "catalog built: {} providers, {} models",
            snapshot.providers.len(),
            snapshot.models.len()
        );
        Ok(snapshot)
    }

    /// Build and publish to `store`, returning the new epoch. On failure the
    /// store keeps serving whatever snapshot it already held.
    pub fn build_and_publish(&self, store: &CatalogStore) -> Result<u64, CatalogError> {
        let snapshot = self.build()?;
        Ok(store.publish(snapshot))
    }

    fn ingest(&self) -> Result<Vec<SourceRecords>, CatalogError> {
        let base = match (&self.base, &self.options.snapshot_path) {
            (Some(document), _) => document.clone(),
            (None, Some(path)) => read_document(path)?,
            (None, None) => packaged_document().clone(),
        };

        let mut sources = vec![
            SourceRecords {
                kind: SourceKind::Packaged,
                providers: base.providers,
                models: base.models,
            },
            SourceRecords {
                kind: SourceKind::Config,
                providers: self.options.overrides.providers.clone(),
                models: self.options.overrides.models.clone(),
            },
        ];
        if let Some(source) = &self.override_source {
            let providers = source.providers();
            ensure_objects(&providers, "provider")?;
            let models = source.models();
            ensure_objects(&models, "model")?;
            sources.push(SourceRecords {
                kind: SourceKind::Override,
                providers,
                models,
            });
        }
        Ok(sources)
    }
}

fn read_document(path: &Path) -> Result<SnapshotDocument, CatalogError> {
    let name = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Source {
        name: name.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse { name, source })
}

fn ensure_objects(records: &[Value], kind: &'static str) -> Result<(), CatalogError> {
    if records.iter().all(Value::is_object) {
        Ok(())
    } else {
        Err(CatalogError::InvalidOverride(kind))
    }
}

fn normalize_sources(sources: Vec<SourceRecords>) -> Vec<SourceRecords> {
    sources
        .into_iter()
        .map(|source| SourceRecords {
            kind: source.kind,
            providers: source.providers.iter().map(normalize_provider).collect(),
            models: source.models.iter().map(normalize_model).collect(),
        })
        .collect()
}

fn validate_sources(sources: Vec<SourceRecords>) -> Vec<SourceRecords> {
    sources
        .into_iter()
        .map(|source| {
            let providers = validate_providers(source.providers);
            let models = validate_models(source.models);
            if providers.dropped > 0 || models.dropped > 0 {
                warn!(
                    "{} source: dropped {} provider and {} model records failing schema validation",
                    source.kind.name(),
                    providers.dropped,
                    models.dropped
                );
            }
            SourceRecords {
                kind: source.kind,
                providers: providers.records,
                models: models.records,
            }
        })
        .collect()
}

fn materialize<T: serde::de::DeserializeOwned>(records: Vec<Value>, kind: &str) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!("dropping unusable {kind} record: {error}");
                None
            }
        })
        .collect()
}

/// Models whose provider has no provider record cannot be resolved and are
/// dropped.
fn drop_orphans(providers: &[Provider], models: &mut Vec<Model>) {
    let known: HashSet<&str> = providers.iter().map(|p| p.id.as_str()).collect();
    models.retain(|model| {
        let keep = known.contains(model.provider.as_str());
        if !keep {
            warn!(
                "dropping model '{}': provider '{}' has no provider record",
                model.id,
                model.provider.as_str()
            );
        }
        keep
    });
}

/// Aliases never shadow a canonical model id of the same provider; lookups
/// always prefer the canonical id, so a shadowing alias is stripped.
fn strip_shadowed_aliases(models: &mut [Model]) {
    let mut canonical: HashMap<String, HashSet<String>> = HashMap::new();
    for model in models.iter() {
        canonical
            .entry(model.provider.as_str().to_string())
            .or_default()
            .insert(model.id.clone());
    }
    for model in models.iter_mut() {
        let Some(ids) = canonical.get(model.provider.as_str()) else {
            continue;
        };
        let provider = model.provider.clone();
        let id = model.id.clone();
        model.aliases.retain(|alias| {
            let shadowed = ids.contains(alias);
            if shadowed {
                warn!(
                    "stripping alias '{alias}' on {}:{id}: shadows a canonical model id",
                    provider.as_str()
                );
            }
            !shadowed
        });
    }
}

fn parse_prefer(raw: &[String]) -> Vec<ProviderId> {
    let mut prefer = Vec::with_capacity(raw.len());
    for entry in raw {
        match ProviderId::parse(entry) {
            Ok(id) => prefer.push(id),
            Err(error) => warn!("skipping prefer entry '{entry}': {error}"),
        }
    }
    prefer
}

fn ensure_viable(snapshot: &Snapshot) -> Result<(), CatalogError> {
    if snapshot.providers.is_empty() {
        return Err(CatalogError::EmptyCatalog("providers"));
    }
    if snapshot.models.is_empty() {
        return Err(CatalogError::EmptyCatalog("models"));
    }
    Ok(())
}
