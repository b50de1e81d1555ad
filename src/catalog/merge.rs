//! Precedence merge across catalog sources.
//!
//! Sources are folded lowest to highest precedence: packaged dataset, then
//! config overrides, then the override source. Records are keyed by provider
//! id, or by (provider, id) for models.

use super::normalize::canonical_symbol;
use super::pattern::{Pattern, PatternError, compile_all};
use super::source::SourceKind;
use super::types::Provider;
use serde_json::Value;
use std::collections::HashMap;
use std::hash::Hash;

/// Deep-merge `overlay` into `base`. Objects merge key by key, arrays
/// concatenate with first-seen dedupe, and anything else is overwritten by
/// the overlay.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            for item in overlay_items {
                if !base_items.contains(item) {
                    base_items.push(item.clone());
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// Merge provider record layers, lowest precedence first.
#[must_use]
pub fn merge_providers(layers: &[Vec<Value>]) -> Vec<Value> {
    merge_keyed(layers, |record| {
        record.get("id").and_then(Value::as_str).map(str::to_string)
    })
}

/// Merge model record layers, lowest precedence first. Each layer is
/// filtered against `excludes` before it participates, so an excluded record
/// contributes no fields to the merge.
#[must_use]
pub fn merge_models(layers: &[(SourceKind, Vec<Value>)], excludes: &ExcludeSet) -> Vec<Value> {
    let filtered: Vec<Vec<Value>> = layers
        .iter()
        .map(|(kind, layer)| {
            layer
                .iter()
                .filter(|record| !excludes.excludes_record(record, *kind))
                .cloned()
                .collect()
        })
        .collect();
    merge_keyed(&filtered, model_key)
}

fn model_key(record: &Value) -> Option<(String, String)> {
    let provider = record.get("provider").and_then(Value::as_str)?;
    let id = record.get("id").and_then(Value::as_str)?;
    Some((provider.to_string(), id.to_string()))
}

/// Fold layers into one record per key. First appearance fixes the output
/// position; later layers deep-merge into it.
fn merge_keyed<K>(layers: &[Vec<Value>], key_of: impl Fn(&Value) -> Option<K>) -> Vec<Value>
where
    K: Hash + Eq + Clone,
{
    let mut order: Vec<K> = Vec::new();
    let mut merged: HashMap<K, Value> = HashMap::new();
    for layer in layers {
        for record in layer {
            let Some(key) = key_of(record) else { continue };
            match merged.get_mut(&key) {
                Some(existing) => deep_merge(existing, record),
                None => {
                    order.push(key.clone());
                    merged.insert(key, record.clone());
                }
            }
        }
    }
    order
        .into_iter()
        .filter_map(|key| merged.remove(&key))
        .collect()
}

/// Model exclusions applied source by source before merging. Every pattern
/// carries the precedence tier it came from and filters contributions at
/// that tier and below, so a higher-precedence source can reintroduce a
/// model a lower tier excluded.
#[derive(Debug, Default)]
pub struct ExcludeSet {
    by_provider: HashMap<String, Vec<(Pattern, SourceKind)>>,
}

impl ExcludeSet {
    /// Compile provider-record patterns at packaged tier, config excludes at
    /// config tier, and override-source excludes at override tier.
    pub fn build(
        providers: &[Provider],
        config_exclude: &HashMap<String, Vec<String>>,
        source_exclude: &HashMap<String, Vec<String>>,
    ) -> Result<Self, PatternError> {
        let mut set = Self::default();
        for provider in providers {
            set.add(
                provider.id.as_str(),
                &provider.exclude_patterns,
                SourceKind::Packaged,
            )?;
        }
        for (provider, globs) in config_exclude {
            set.add(&canonical_symbol(provider), globs, SourceKind::Config)?;
        }
        for (provider, globs) in source_exclude {
            set.add(&canonical_symbol(provider), globs, SourceKind::Override)?;
        }
        Ok(set)
    }

    fn add(
        &mut self,
        provider: &str,
        globs: &[String],
        origin: SourceKind,
    ) -> Result<(), PatternError> {
        if globs.is_empty() {
            return Ok(());
        }
        let compiled = compile_all(globs)?;
        self.by_provider
            .entry(provider.to_string())
            .or_default()
            .extend(compiled.into_iter().map(|pattern| (pattern, origin)));
        Ok(())
    }

    /// Whether a model is excluded from a source of the given precedence.
    #[must_use]
    pub fn excluded(&self, provider: &str, model_id: &str, from: SourceKind) -> bool {
        self.by_provider.get(provider).is_some_and(|patterns| {
            patterns
                .iter()
                .any(|(pattern, origin)| *origin >= from && pattern.matches(model_id))
        })
    }

    fn excludes_record(&self, record: &Value, from: SourceKind) -> bool {
        match model_key(record) {
            Some((provider, id)) => self.excluded(&provider, &id, from),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_overwrite_by_higher_precedence() {
        let layers = vec![
            vec![json!({"id": "acme", "name": "Acme", "base_url": "https://old"})],
            vec![json!({"id": "acme", "base_url": "https://new"})],
        ];
        let merged = merge_providers(&layers);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["name"], "Acme");
        assert_eq!(merged[0]["base_url"], "https://new");
    }

    #[test]
    fn test_maps_merge_recursively() {
        let layers = vec![
            (
                SourceKind::Packaged,
                vec![json!({
                    "id": "m-1", "provider": "acme",
                    "capabilities": {"tools": {"enabled": true}, "chat": true}
                })],
            ),
            (
                SourceKind::Config,
                vec![json!({
                    "id": "m-1", "provider": "acme",
                    "capabilities": {"tools": {"streaming": true}}
                })],
            ),
        ];
        let merged = merge_models(&layers, &ExcludeSet::default());
        assert_eq!(merged[0]["capabilities"]["tools"]["enabled"], true);
        assert_eq!(merged[0]["capabilities"]["tools"]["streaming"], true);
        assert_eq!(merged[0]["capabilities"]["chat"], true);
    }

    #[test]
    fn test_lists_concat_and_dedupe() {
        let layers = vec![
            (
                SourceKind::Packaged,
                vec![json!({"id": "m-1", "provider": "acme", "tags": ["fast", "cheap"]})],
            ),
            (
                SourceKind::Config,
                vec![json!({"id": "m-1", "provider": "acme", "tags": ["cheap", "new"]})],
            ),
        ];
        let merged = merge_models(&layers, &ExcludeSet::default());
        assert_eq!(merged[0]["tags"], json!(["fast", "cheap", "new"]));
    }

    #[test]
    fn test_distinct_keys_never_merge() {
        let layers = vec![
            (
                SourceKind::Packaged,
                vec![json!({"id": "shared", "provider": "acme", "name": "A"})],
            ),
            (
                SourceKind::Config,
                vec![json!({"id": "shared", "provider": "zeta", "name": "Z"})],
            ),
        ];
        let merged = merge_models(&layers, &ExcludeSet::default());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0]["name"], "A");
        assert_eq!(merged[1]["name"], "Z");
    }

    #[test]
    fn test_first_seen_order_is_stable() {
        let layers = vec![
            (
                SourceKind::Packaged,
                vec![
                    json!({"id": "a", "provider": "acme"}),
                    json!({"id": "b", "provider": "acme"}),
                ],
            ),
            (
                SourceKind::Config,
                vec![
                    json!({"id": "c", "provider": "acme"}),
                    json!({"id": "a", "provider": "acme", "name": "A"}),
                ],
            ),
        ];
        let merged = merge_models(&layers, &ExcludeSet::default());
        let ids: Vec<&str> = merged.iter().map(|m| m["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(merged[0]["name"], "A");
    }

    #[test]
    fn test_excludes_cover_origin_tier_and_below() {
        let exclude = HashMap::from([("acme".to_string(), vec!["legacy-*".to_string()])]);
        let excludes = ExcludeSet::build(&[], &exclude, &HashMap::new()).unwrap();
        let layers = vec![
            (
                SourceKind::Packaged,
                vec![
                    json!({"id": "legacy-1", "provider": "acme", "name": "Old"}),
                    json!({"id": "current-1", "provider": "acme"}),
                ],
            ),
            (
                SourceKind::Config,
                vec![json!({"id": "legacy-1", "provider": "acme", "name": "Patched"})],
            ),
        ];
        let merged = merge_models(&layers, &excludes);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["id"], "current-1");
    }

    #[test]
    fn test_higher_tier_reintroduces_excluded_model() {
        let exclude = HashMap::from([("acme".to_string(), vec!["legacy-*".to_string()])]);
        let excludes = ExcludeSet::build(&[], &exclude, &HashMap::new()).unwrap();
        let layers = vec![
            (
                SourceKind::Packaged,
                vec![json!({"id": "legacy-1", "provider": "acme", "name": "Old"})],
            ),
            (
                SourceKind::Override,
                vec![json!({"id": "legacy-1", "provider": "acme", "name": "Restored"})],
            ),
        ];
        let merged = merge_models(&layers, &excludes);
        assert_eq!(merged.len(), 1);
        // The packaged record stayed dropped; none of its fields leak in.
        assert_eq!(merged[0]["name"], "Restored");
    }

    #[test]
    fn test_excludes_only_hit_their_provider() {
        let exclude = HashMap::from([("acme".to_string(), vec!["*".to_string()])]);
        let excludes = ExcludeSet::build(&[], &exclude, &HashMap::new()).unwrap();
        assert!(excludes.excluded("acme", "anything", SourceKind::Packaged));
        assert!(!excludes.excluded("zeta", "anything", SourceKind::Packaged));
    }

    #[test]
    fn test_provider_exclude_patterns_feed_the_set() {
        let provider: Provider = serde_json::from_value(json!({
            "id": "acme",
            "exclude_patterns": ["*-preview"]
        }))
        .unwrap();
        let excludes =
            ExcludeSet::build(std::slice::from_ref(&provider), &HashMap::new(), &HashMap::new())
                .unwrap();
        assert!(excludes.excluded("acme", "chat-preview", SourceKind::Packaged));
        assert!(!excludes.excluded("acme", "chat", SourceKind::Packaged));
        // Provider-record patterns stop at the packaged tier.
        assert!(!excludes.excluded("acme", "chat-preview", SourceKind::Config));
    }
}
