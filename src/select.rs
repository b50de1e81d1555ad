//! Capability-based model selection.
//!
//! A query names capabilities a model must have and must not have; the
//! selector walks candidates in catalog order, after provider preferences
//! are applied, and returns the first model satisfying both lists.

use crate::catalog::{Capabilities, Model, ProviderId, Snapshot};
use crate::resolve::{Resolution, Resolved};
use crate::store::CatalogStore;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectError {
    #[error("no model satisfies require=[{}] forbid=[{}]", .require.join(", "), .forbid.join(", "))]
    NoMatch {
        require: Vec<String>,
        forbid: Vec<String>,
    },

    #[error("unknown capability '{0}'")]
    UnknownCapability(String),

    #[error("no catalog loaded")]
    NotLoaded,
}

/// One selectable capability, addressing a leaf of [`Capabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Chat,
    Embeddings,
    Reasoning,
    Tools,
    ToolsStreaming,
    ToolsStrict,
    ToolsParallel,
    JsonNative,
    JsonSchema,
    JsonStrict,
    StreamingText,
    StreamingToolCalls,
}

impl Capability {
    pub const ALL: &'static [Capability] = &[
        Self::Chat,
        Self::Embeddings,
        Self::Reasoning,
        Self::Tools,
        Self::ToolsStreaming,
        Self::ToolsStrict,
        Self::ToolsParallel,
        Self::JsonNative,
        Self::JsonSchema,
        Self::JsonStrict,
        Self::StreamingText,
        Self::StreamingToolCalls,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Embeddings => "embeddings",
            Self::Reasoning => "reasoning",
            Self::Tools => "tools",
            Self::ToolsStreaming => "tools_streaming",
            Self::ToolsStrict => "tools_strict",
            Self::ToolsParallel => "tools_parallel",
            Self::JsonNative => "json_native",
            Self::JsonSchema => "json_schema",
            Self::JsonStrict => "json_strict",
            Self::StreamingText => "streaming_text",
            Self::StreamingToolCalls => "streaming_tool_calls",
        }
    }

    /// Whether a model's capability record has this capability enabled.
    #[must_use]
    pub fn enabled(self, caps: &Capabilities) -> bool {
        match self {
            Self::Chat => caps.chat,
            Self::Embeddings => caps.embeddings,
            Self::Reasoning => caps.reasoning.enabled,
            Self::Tools => caps.tools.enabled,
            Self::ToolsStreaming => caps.tools.streaming,
            Self::ToolsStrict => caps.tools.strict,
            Self::ToolsParallel => caps.tools.parallel,
            Self::JsonNative => caps.json.native,
            Self::JsonSchema => caps.json.schema,
            Self::JsonStrict => caps.json.strict,
            Self::StreamingText => caps.streaming.text,
            Self::StreamingToolCalls => caps.streaming.tool_calls,
        }
    }
}

impl FromStr for Capability {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|capability| capability.key() == key)
            .ok_or_else(|| SelectError::UnknownCapability(key.to_string()))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A capability query.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub require: Vec<Capability>,
    pub forbid: Vec<Capability>,
    /// Restrict candidates to one provider. Preference ordering is inert
    /// under an explicit scope.
    pub scope: Option<ProviderId>,
    /// Replaces the snapshot's preference order when set.
    pub prefer: Option<Vec<ProviderId>>,
}

/// Select the first model satisfying the query.
pub fn select_model<'a>(
    catalog: &'a Snapshot,
    query: &SelectQuery,
) -> Result<Resolution<'a>, SelectError> {
    let mut candidates: Vec<&Model> = match &query.scope {
        Some(provider) => catalog.models_for(provider.as_str()),
        None => catalog.models.iter().collect(),
    };

    let prefer = query.prefer.as_deref().unwrap_or(&catalog.prefer);
    if !prefer.is_empty() && query.scope.is_none() {
        // Stable sort: preferred providers move to the front in preference
        // order, everything else keeps catalog order behind them.
        candidates.sort_by_key(|model| {
            prefer
                .iter()
                .position(|p| p == &model.provider)
                .unwrap_or(prefer.len())
        });
    }

    for model in candidates {
        if query.require.iter().all(|c| c.enabled(&model.capabilities))
            && query.forbid.iter().all(|c| !c.enabled(&model.capabilities))
            && let Some(provider) = catalog.provider(model.provider.as_str())
        {
            return Ok(Resolution { provider, model });
        }
    }

    Err(SelectError::NoMatch {
        require: query.require.iter().map(|c| c.key().to_string()).collect(),
        forbid: query.forbid.iter().map(|c| c.key().to_string()).collect(),
    })
}

/// Select against the snapshot published in `store`. Fails with
/// [`SelectError::NotLoaded`] when nothing has been published.
pub fn select_from(store: &CatalogStore, query: &SelectQuery) -> Result<Resolved, SelectError> {
    let snapshot = store.get().ok_or(SelectError::NotLoaded)?;
    select_model(&snapshot, query).map(Resolution::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, CatalogOptions, SnapshotDocument};
    use serde_json::json;

    fn catalog_with(options: CatalogOptions) -> Snapshot {
        let document: SnapshotDocument = serde_json::from_value(json!({
            "providers": [
                {"id": "anthropic"},
                {"id": "openai"},
                {"id": "deepseek"},
            ],
            "models": [
                {
                    "id": "claude-opus-4-1",
                    "provider": "anthropic",
                    "capabilities": {
                        "reasoning": {"enabled": true},
                        "tools": {"enabled": true, "streaming": true, "parallel": true},
                        "json": {"native": true, "schema": true},
                        "streaming": {"text": true, "tool_calls": true}
                    }
                },
                {
                    "id": "gpt-4o",
                    "provider": "openai",
                    "capabilities": {
                        "tools": {"enabled": true, "streaming": true, "strict": true, "parallel": true},
                        "json": {"native": true, "schema": true, "strict": true}
                    }
                },
                {
                    "id": "text-embedding-3-large",
                    "provider": "openai",
                    "capabilities": {"chat": false, "embeddings": true, "streaming": {"text": false}}
                },
                {
                    "id": "deepseek-reasoner",
                    "provider": "deepseek",
                    "capabilities": {"reasoning": {"enabled": true}}
                },
            ]
        }))
        .unwrap();
        CatalogBuilder::new(options)
            .with_base_document(document)
            .build()
            .unwrap()
    }

    fn catalog() -> Snapshot {
        catalog_with(CatalogOptions::default())
    }

    #[test]
    fn test_capability_parsing() {
        assert_eq!(
            "tools_parallel".parse::<Capability>().unwrap(),
            Capability::ToolsParallel
        );
        assert_eq!(
            " streaming_text ".parse::<Capability>().unwrap(),
            Capability::StreamingText
        );
        assert_eq!(
            "flying".parse::<Capability>(),
            Err(SelectError::UnknownCapability("flying".to_string()))
        );
    }

    #[test]
    fn test_require_first_match_in_catalog_order() {
        let catalog = catalog();
        let query = SelectQuery {
            require: vec![Capability::Tools],
            ..SelectQuery::default()
        };
        let found = select_model(&catalog, &query).unwrap();
        assert_eq!(found.model.id, "claude-opus-4-1");
    }

    #[test]
    fn test_require_multiple() {
        let catalog = catalog();
        let query = SelectQuery {
            require: vec![Capability::Tools, Capability::JsonStrict],
            ..SelectQuery::default()
        };
        let found = select_model(&catalog, &query).unwrap();
        assert_eq!(found.model.id, "gpt-4o");
    }

    #[test]
    fn test_forbid_excludes_matches() {
        let catalog = catalog();
        let query = SelectQuery {
            require: vec![Capability::Reasoning],
            forbid: vec![Capability::Tools],
            ..SelectQuery::default()
        };
        let found = select_model(&catalog, &query).unwrap();
        assert_eq!(found.model.id, "deepseek-reasoner");
    }

    #[test]
    fn test_no_match_reports_query() {
        let catalog = catalog();
        let query = SelectQuery {
            require: vec![Capability::Embeddings, Capability::Tools],
            ..SelectQuery::default()
        };
        let error = select_model(&catalog, &query).unwrap_err();
        assert_eq!(
            error.to_string(),
            "no model satisfies require=[embeddings, tools] forbid=[]"
        );
    }

    #[test]
    fn test_defaults_make_plain_chat_selectable() {
        let catalog = catalog();
        let query = SelectQuery {
            require: vec![Capability::Chat, Capability::StreamingText],
            ..SelectQuery::default()
        };
        assert!(select_model(&catalog, &query).is_ok());
    }

    #[test]
    fn test_scope_restricts_candidates() {
        let catalog = catalog();
        let query = SelectQuery {
            require: vec![Capability::Reasoning],
            scope: Some(ProviderId::parse("openai").unwrap()),
            ..SelectQuery::default()
        };
        assert!(matches!(
            select_model(&catalog, &query),
            Err(SelectError::NoMatch { .. })
        ));
    }

    #[test]
    fn test_query_prefer_reorders_providers() {
        let catalog = catalog();
        let query = SelectQuery {
            require: vec![Capability::Reasoning],
            prefer: Some(vec![ProviderId::parse("deepseek").unwrap()]),
            ..SelectQuery::default()
        };
        let found = select_model(&catalog, &query).unwrap();
        assert_eq!(found.provider.id, "deepseek");
    }

    #[test]
    fn test_snapshot_prefer_applies_when_query_has_none() {
        let options: CatalogOptions = serde_json::from_value(json!({
            "prefer": ["deepseek", "anthropic"]
        }))
        .unwrap();
        let catalog = catalog_with(options);
        let query = SelectQuery {
            require: vec![Capability::Reasoning],
            ..SelectQuery::default()
        };
        let found = select_model(&catalog, &query).unwrap();
        assert_eq!(found.provider.id, "deepseek");
    }

    #[test]
    fn test_prefer_inert_under_scope() {
        let catalog = catalog();
        let query = SelectQuery {
            require: vec![Capability::Reasoning],
            scope: Some(ProviderId::parse("anthropic").unwrap()),
            prefer: Some(vec![ProviderId::parse("deepseek").unwrap()]),
            ..SelectQuery::default()
        };
        let found = select_model(&catalog, &query).unwrap();
        assert_eq!(found.provider.id, "anthropic");
    }

    #[test]
    fn test_select_from_store() {
        let store = CatalogStore::new();
        let query = SelectQuery {
            require: vec![Capability::Reasoning],
            ..SelectQuery::default()
        };
        assert!(matches!(
            select_from(&store, &query),
            Err(SelectError::NotLoaded)
        ));

        store.publish(catalog());
        let found = select_from(&store, &query).unwrap();
        assert_eq!(found.model.id, "claude-opus-4-1");
    }
}
