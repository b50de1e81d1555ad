//! Allow and deny filtering.

use super::error::CatalogError;
use super::normalize::canonical_symbol;
use super::options::{ALLOW_ALL, AllowList};
use super::pattern::{Pattern, compile_all};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum AllowRule {
    All,
    PerProvider(HashMap<String, Vec<Pattern>>),
}

/// Compiled allow/deny rules, built once per catalog build.
#[derive(Debug, Clone)]
pub struct FilterSet {
    allow: AllowRule,
    deny: HashMap<String, Vec<Pattern>>,
}

impl FilterSet {
    pub fn build(
        allow: &AllowList,
        deny: &HashMap<String, Vec<String>>,
    ) -> Result<Self, CatalogError> {
        let allow = match allow {
            AllowList::Sentinel(s) if s == ALLOW_ALL => AllowRule::All,
            AllowList::Sentinel(s) => return Err(CatalogError::InvalidAllowList(s.clone())),
            AllowList::PerProvider(map) => AllowRule::PerProvider(compile_map(map)?),
        };
        Ok(Self {
            allow,
            deny: compile_map(deny)?,
        })
    }

    /// A filter set admitting everything.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            allow: AllowRule::All,
            deny: HashMap::new(),
        }
    }

    /// Whether a model passes. Deny is checked first and always wins; the
    /// allow stage then applies its asymmetric map semantics.
    #[must_use]
    pub fn admits(&self, provider: &str, model_id: &str) -> bool {
        if let Some(patterns) = self.deny.get(provider)
            && patterns.iter().any(|p| p.matches(model_id))
        {
            return false;
        }
        match &self.allow {
            AllowRule::All => true,
            AllowRule::PerProvider(map) if map.is_empty() => true,
            AllowRule::PerProvider(map) => map
                .get(provider)
                .is_some_and(|patterns| patterns.iter().any(|p| p.matches(model_id))),
        }
    }
}

/// Compile a provider-to-globs map, canonicalizing keys. Two raw keys that
/// coerce to the same symbol have their pattern lists combined.
fn compile_map(
    map: &HashMap<String, Vec<String>>,
) -> Result<HashMap<String, Vec<Pattern>>, CatalogError> {
    let mut compiled: HashMap<String, Vec<Pattern>> = HashMap::new();
    for (provider, globs) in map {
        compiled
            .entry(canonical_symbol(provider))
            .or_default()
            .extend(compile_all(globs)?);
    }
    Ok(compiled)
}
