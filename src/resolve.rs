//! Model reference parsing and resolution.
//!
//! Input arrives in three shapes: a `provider:model` spec, a separate
//! provider/model pair, or a bare model id. Bare ids resolve within an
//! optional provider scope, or across every provider when unscoped.

use crate::catalog::{Model, Provider, ProviderId, ProviderIdError, Snapshot};
use crate::store::CatalogStore;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("invalid provider: {0}")]
    BadProvider(#[from] ProviderIdError),

    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("invalid model spec '{0}': expected provider:model")]
    InvalidFormat(String),

    #[error("model '{id}' not found{}", scope_suffix(.provider))]
    NotFound {
        id: String,
        provider: Option<String>,
    },

    #[error("model '{id}' is ambiguous across providers: {}", .providers.join(", "))]
    Ambiguous { id: String, providers: Vec<String> },

    #[error("no catalog loaded")]
    NotLoaded,
}

fn scope_suffix(provider: &Option<String>) -> String {
    match provider {
        Some(provider) => format!(" under provider '{provider}'"),
        None => String::new(),
    }
}

/// A model reference before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelRef {
    /// A `provider:model` spec.
    Spec(String),
    /// Provider and model supplied separately.
    Pair { provider: String, model: String },
    /// A bare model id or alias.
    Id(String),
}

impl ModelRef {
    /// Classify raw input. Anything containing a colon is a spec; the rest
    /// is a bare id.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.contains(':') {
            Self::Spec(raw.to_string())
        } else {
            Self::Id(raw.to_string())
        }
    }
}

/// Split a `provider:model` spec on the first colon. The model part may
/// itself contain colons.
pub fn parse_spec(spec: &str) -> Result<(String, String), ResolveError> {
    let Some((provider, model)) = spec.split_once(':') else {
        return Err(ResolveError::InvalidFormat(spec.to_string()));
    };
    let provider = provider.trim();
    let model = model.trim();
    if provider.is_empty() || model.is_empty() {
        return Err(ResolveError::InvalidFormat(spec.to_string()));
    }
    Ok((provider.to_string(), model.to_string()))
}

/// Canonicalize a raw provider name and check it exists in the catalog.
pub fn parse_provider(catalog: &Snapshot, raw: &str) -> Result<ProviderId, ResolveError> {
    let id = ProviderId::parse(raw)?;
    if catalog.has_provider(id.as_str()) {
        Ok(id)
    } else {
        Err(ResolveError::UnknownProvider(id.as_str().to_string()))
    }
}

/// A resolved provider/model pair borrowed from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub provider: &'a Provider,
    pub model: &'a Model,
}

impl Resolution<'_> {
    #[must_use]
    pub fn into_owned(self) -> Resolved {
        Resolved {
            provider: self.provider.clone(),
            model: self.model.clone(),
        }
    }
}

/// An owned resolution, for callers that outlive the snapshot borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub provider: Provider,
    pub model: Model,
}

/// Resolve against the snapshot published in `store`. Fails with
/// [`ResolveError::NotLoaded`] when nothing has been published.
pub fn resolve_from(
    store: &CatalogStore,
    reference: &ModelRef,
    scope: Option<&str>,
) -> Result<Resolved, ResolveError> {
    let snapshot = store.get().ok_or(ResolveError::NotLoaded)?;
    resolve(&snapshot, reference, scope).map(Resolution::into_owned)
}

/// Resolve a model reference against the snapshot.
///
/// A spec carries its own provider, so `scope` applies only to bare ids.
/// Within a provider, aliases substitute before the lookup.
pub fn resolve<'a>(
    catalog: &'a Snapshot,
    reference: &ModelRef,
    scope: Option<&str>,
) -> Result<Resolution<'a>, ResolveError> {
    match reference {
        ModelRef::Spec(spec) => {
            let (provider, model) = parse_spec(spec)?;
            let provider = parse_provider(catalog, &provider)?;
            resolve_in(catalog, &provider, &model)
        }
        ModelRef::Pair { provider, model } => {
            let provider = parse_provider(catalog, provider)?;
            resolve_in(catalog, &provider, model.trim())
        }
        ModelRef::Id(id) => match scope {
            Some(scope) => {
                let provider = parse_provider(catalog, scope)?;
                resolve_in(catalog, &provider, id.trim())
            }
            None => resolve_anywhere(catalog, id.trim()),
        },
    }
}

fn resolve_in<'a>(
    catalog: &'a Snapshot,
    provider: &ProviderId,
    model: &str,
) -> Result<Resolution<'a>, ResolveError> {
    let canonical = catalog
        .resolve_alias(provider.as_str(), model)
        .unwrap_or(model);
    match catalog.model(provider.as_str(), canonical) {
        Some(found) => {
            let record = catalog
                .provider(provider.as_str())
                .ok_or_else(|| ResolveError::UnknownProvider(provider.as_str().to_string()))?;
            Ok(Resolution {
                provider: record,
                model: found,
            })
        }
        None => Err(ResolveError::NotFound {
            id: model.to_string(),
            provider: Some(provider.as_str().to_string()),
        }),
    }
}

fn resolve_anywhere<'a>(catalog: &'a Snapshot, id: &str) -> Result<Resolution<'a>, ResolveError> {
    let mut matches: Vec<Resolution<'a>> = Vec::new();
    for provider in &catalog.providers {
        let canonical = catalog
            .resolve_alias(provider.id.as_str(), id)
            .unwrap_or(id);
        if let Some(model) = catalog.model(provider.id.as_str(), canonical) {
            matches.push(Resolution { provider, model });
        }
    }
    match matches.as_slice() {
        [] => Err(ResolveError::NotFound {
            id: id.to_string(),
            provider: None,
        }),
        [single] => Ok(*single),
        many => {
            let mut providers: Vec<String> = many
                .iter()
                .map(|m| m.provider.id.as_str().to_string())
                .collect();
            providers.sort();
            Err(ResolveError::Ambiguous {
                id: id.to_string(),
                providers,
            })
        }
    }
}
