//! Tenant setting model: a JSON value under a taxonomy-style key, with
//! an optional attached file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::taxonomy::TaxonomyKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub tenant_id: Uuid,
    pub key: TaxonomyKey,
    pub value: serde_json::Value,
    /// Storage path of the attached file (logo, terms PDF, ...).
    pub file_path: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertSetting {
    pub tenant_id: Uuid,
    pub key: TaxonomyKey,
    pub value: serde_json::Value,
    pub file_path: Option<String>,
}
