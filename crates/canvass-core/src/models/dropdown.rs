//! Dropdown option domain model.
//!
//! A dropdown is a named taxonomy (`industry`, `campaign-goal`, ...)
//! whose options carry one label per language.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::FallbackChain;
use crate::taxonomy::TaxonomyKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropdownOption {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Taxonomy this option belongs to.
    pub kind: TaxonomyKey,
    /// Stable machine value stored by clients (e.g., `healthcare`).
    pub value: String,
    /// Language code to display label.
    pub labels: BTreeMap<String, String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DropdownOption {
    /// Resolve the label for the first language in `chain` that has one,
    /// falling back to the raw `value`.
    pub fn label_for(&self, chain: &FallbackChain) -> (&str, Option<&str>) {
        for code in chain.iter() {
            if let Some((lang, label)) = self.labels.get_key_value(code) {
                return (label.as_str(), Some(lang.as_str()));
            }
        }
        (self.value.as_str(), None)
    }
}

#[derive(Debug, Clone)]
pub struct CreateDropdownOption {
    pub tenant_id: Uuid,
    pub kind: TaxonomyKey,
    pub value: String,
    pub labels: BTreeMap<String, String>,
    pub sort_order: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDropdownOption {
    pub labels: Option<BTreeMap<String, String>>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::fallback_chain;

    fn option(labels: &[(&str, &str)]) -> DropdownOption {
        DropdownOption {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            kind: TaxonomyKey::parse("industry").unwrap(),
            value: "healthcare".into(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            sort_order: 0,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn label_uses_primary_language() {
        let opt = option(&[("en", "Healthcare"), ("es", "Salud")]);
        assert_eq!(opt.label_for(&fallback_chain("es")), ("Salud", Some("es")));
    }

    #[test]
    fn label_degrades_to_english() {
        let opt = option(&[("en", "Healthcare")]);
        assert_eq!(
            opt.label_for(&fallback_chain("fr")),
            ("Healthcare", Some("en"))
        );
    }

    #[test]
    fn label_degrades_to_value() {
        let opt = option(&[("de", "Gesundheit")]);
        assert_eq!(opt.label_for(&fallback_chain("fr")), ("healthcare", None));
    }
}
