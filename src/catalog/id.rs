//! Provider identifiers.
//!
//! Providers are addressed by a canonical lower_snake_case symbol. Raw names
//! from configs and upstream documents are coerced before validation, so
//! "Anthropic" and "anthropic " both land on `anthropic`.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderIdError {
    #[error("provider name is empty")]
    Empty,

    #[error("provider name '{0}' is not a lowercase symbol ([a-z][a-z0-9_]*)")]
    Invalid(String),
}

/// Canonical provider symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Coerce a raw name to canonical form, then validate it.
    pub fn parse(raw: &str) -> Result<Self, ProviderIdError> {
        let symbol = super::normalize::canonical_symbol(raw);
        if symbol.is_empty() {
            return Err(ProviderIdError::Empty);
        }
        if !is_canonical(&symbol) {
            return Err(ProviderIdError::Invalid(raw.trim().to_string()));
        }
        Ok(Self(symbol))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_canonical(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProviderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProviderId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProviderId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}

// Records arrive normalized, but config files and embedders hand us raw
// names, so deserialization runs the same coercion.
impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
