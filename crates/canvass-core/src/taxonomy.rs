//! Taxonomy keys: canonical identifiers for dropdown categories and
//! setting names.
//!
//! Keys are normalized (trimmed and lowercased) at every boundary, so
//! `"Industry "` and `"INDUSTRY"` both become `industry`. A valid key
//! starts with a letter, contains only `a-z`, `0-9`, `-` and `_`, and is
//! 2–50 characters long.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CanvassError, CanvassResult};

pub const MIN_KEY_LEN: usize = 2;
pub const MAX_KEY_LEN: usize = 50;

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]*$").expect("static pattern"));

/// Trim surrounding whitespace and lowercase.
pub fn normalize_taxonomy_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether `raw` normalizes to a valid key.
pub fn is_valid_taxonomy_key(raw: &str) -> bool {
    let key = normalize_taxonomy_key(raw);
    (MIN_KEY_LEN..=MAX_KEY_LEN).contains(&key.len()) && KEY_PATTERN.is_match(&key)
}

/// A validated, normalized taxonomy key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxonomyKey(String);

impl TaxonomyKey {
    pub fn parse(raw: &str) -> CanvassResult<Self> {
        if !is_valid_taxonomy_key(raw) {
            return Err(CanvassError::validation(format!(
                "invalid key '{}': expected {MIN_KEY_LEN}-{MAX_KEY_LEN} characters, \
                 starting with a letter, using a-z, 0-9, '-' or '_'",
                raw.trim()
            )));
        }
        Ok(Self(normalize_taxonomy_key(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxonomyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TaxonomyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaxonomyKey {
    type Error = CanvassError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaxonomyKey> for String {
    fn from(key: TaxonomyKey) -> Self {
        key.0
    }
}
