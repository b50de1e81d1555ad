//! Glob compilation for model-id filters.
//!
//! The only metacharacter is `*`, matching any run of characters including
//! none. Everything else is literal. Matches are anchored to the whole id
//! and case-sensitive.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid filter pattern '{pattern}': {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled model-id glob.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(glob: &str) -> Result<Self, PatternError> {
        let mut expr = String::with_capacity(glob.len() + 4);
        expr.push('^');
        for (position, literal) in glob.split('*').enumerate() {
            if position > 0 {
                expr.push_str(".*");
            }
            expr.push_str(&regex::escape(literal));
        }
        expr.push('$');
        let regex = Regex::new(&expr).map_err(|source| PatternError::Compile {
            pattern: glob.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

pub fn compile_all(globs: &[String]) -> Result<Vec<Pattern>, PatternError> {
    globs.iter().map(|glob| Pattern::new(glob)).collect()
}
