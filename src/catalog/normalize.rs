//! Record normalization ahead of validation.
//!
//! Pure and infallible: malformed input passes through unchanged so the
//! validator can reject it with a count.

use serde_json::{Map, Value};

/// Coerce a raw provider name to its canonical lower_snake_case symbol.
/// Dashes and whitespace become underscores; no characters are removed,
/// so invalid input stays invalid for the validator to catch.
#[must_use]
pub fn canonical_symbol(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c == '-' || c.is_whitespace() {
                '_'
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// Normalize one provider record: trim keys recursively and canonicalize
/// the `id`. Non-object records are returned untouched.
#[must_use]
pub fn normalize_provider(record: &Value) -> Value {
    let Value::Object(fields) = record else {
        return record.clone();
    };
    let mut out = trim_keys(fields);
    if let Some(Value::String(id)) = out.get_mut("id") {
        *id = canonical_symbol(id);
    }
    Value::Object(out)
}

/// Normalize one model record: trim keys recursively, canonicalize the
/// `provider` symbol, and trim the `id` and any aliases. Non-object records
/// are returned untouched.
#[must_use]
pub fn normalize_model(record: &Value) -> Value {
    let Value::Object(fields) = record else {
        return record.clone();
    };
    let mut out = trim_keys(fields);
    if let Some(Value::String(provider)) = out.get_mut("provider") {
        *provider = canonical_symbol(provider);
    }
    if let Some(Value::String(id)) = out.get_mut("id") {
        *id = id.trim().to_string();
    }
    if let Some(Value::Array(aliases)) = out.get_mut("aliases") {
        for alias in aliases.iter_mut() {
            if let Value::String(s) = alias {
                *s = s.trim().to_string();
            }
        }
    }
    Value::Object(out)
}

fn trim_keys(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.trim().to_string(), trim_value(value)))
        .collect()
}

fn trim_value(value: &Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(trim_keys(fields)),
        Value::Array(items) => Value::Array(items.iter().map(trim_value).collect()),
        other => other.clone(),
    }
}
