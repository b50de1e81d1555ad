//! Schema validation of normalized records.
//!
//! Records failing the schema are dropped and counted, never fatal. The
//! schemas ship inside the binary; a record is either valid against its
//! schema or it is gone.

use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::Value;

static PROVIDER_SCHEMA_RAW: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schema/provider.schema.json"))
        .expect("provider.schema.json must be valid JSON")
});

static PROVIDER_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    JSONSchema::compile(&PROVIDER_SCHEMA_RAW).expect("provider.schema.json must compile")
});

static MODEL_SCHEMA_RAW: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schema/model.schema.json"))
        .expect("model.schema.json must be valid JSON")
});

static MODEL_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    JSONSchema::compile(&MODEL_SCHEMA_RAW).expect("model.schema.json must compile")
});

/// One source's records after validation, plus how many were dropped.
#[derive(Debug)]
pub struct Validated {
    pub records: Vec<Value>,
    pub dropped: usize,
}

#[must_use]
pub fn validate_providers(records: Vec<Value>) -> Validated {
    validate_with(&PROVIDER_SCHEMA, records, "provider")
}

#[must_use]
pub fn validate_models(records: Vec<Value>) -> Validated {
    validate_with(&MODEL_SCHEMA, records, "model")
}

fn validate_with(schema: &JSONSchema, records: Vec<Value>, kind: &str) -> Validated {
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        // The error iterator borrows the record; fold it to an owned string
        // before the record moves into the kept list.
        let detail = schema.validate(&record).err().map(|errors| {
            errors
                .map(|error| error.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        });
        match detail {
            None => kept.push(record),
            Some(detail) => {
                tracing::debug!("dropping invalid {kind} record: {detail}");
                dropped += 1;
            }
        }
    }
    Validated {
        records: kept,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_records_pass() {
        let result = validate_providers(vec![
            json!({"id": "acme", "name": "Acme", "env": ["ACME_API_KEY"]}),
            json!({"id": "zeta"}),
        ]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.dropped, 0);

        let result = validate_models(vec![json!({
            "id": "acme-chat-1",
            "provider": "acme",
            "limits": {"context": 128_000},
            "capabilities": {"tools": {"enabled": true}}
        })]);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.dropped, 0);
    }

    #[test]
    fn test_invalid_records_dropped_and_counted() {
        let result = validate_models(vec![
            json!({"id": "ok-model", "provider": "acme"}),
            json!({"id": "missing-provider"}),
            json!("not even an object"),
            json!({"id": 42, "provider": "acme"}),
        ]);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.dropped, 3);
        // The surviving record comes through unchanged.
        assert_eq!(
            result.records[0],
            json!({"id": "ok-model", "provider": "acme"})
        );
    }

    #[test]
    fn test_provider_id_shape_is_enforced() {
        // Canonicalization runs before validation; an id that still has
        // uppercase or separators here is a genuinely bad record.
        let result = validate_providers(vec![
            json!({"id": "Not Canonical"}),
            json!({"id": "9starts_with_digit"}),
            json!({"name": "no id at all"}),
        ]);
        assert!(result.records.is_empty());
        assert_eq!(result.dropped, 3);
    }

    #[test]
    fn test_wrong_nested_types_are_dropped() {
        let result = validate_models(vec![json!({
            "id": "m-1",
            "provider": "acme",
            "limits": {"context": "lots"}
        })]);
        assert_eq!(result.dropped, 1);
    }

    #[test]
    fn test_unknown_fields_are_allowed() {
        let result = validate_models(vec![json!({
            "id": "m-1",
            "provider": "acme",
            "knowledge_cutoff": "2025-01"
        })]);
        assert_eq!(result.records.len(), 1);
    }
}
