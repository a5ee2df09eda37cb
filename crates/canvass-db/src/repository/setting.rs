//! SurrealDB implementation of [`SettingRepository`].
//!
//! A setting's record id is `<tenant_id>/<key>`, which makes `upsert` a
//! single `UPSERT` on a known record. The key and value live in the
//! `name` and `data` columns.

use canvass_core::error::CanvassResult;
use canvass_core::models::setting::{Setting, UpsertSetting};
use canvass_core::repository::SettingRepository;
use canvass_core::taxonomy::TaxonomyKey;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{IdRow, not_found, parse_uuid};
use crate::error::DbError;

const SELECT_BY_ID: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('setting', $id)";

#[derive(Debug, SurrealValue)]
struct SettingRow {
    #[allow(dead_code)]
    record_id: String,
    tenant_id: String,
    name: String,
    data: serde_json::Value,
    file_path: Option<String>,
    updated_at: DateTime<Utc>,
}

impl SettingRow {
    fn try_into_setting(self) -> Result<Setting, DbError> {
        Ok(Setting {
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            key: TaxonomyKey::try_from(self.name).map_err(|e| DbError::Decode(e.to_string()))?,
            value: self.data,
            file_path: self.file_path,
            updated_at: self.updated_at,
        })
    }
}

fn record_key(tenant_id: Uuid, key: &TaxonomyKey) -> String {
    format!("{tenant_id}/{key}")
}

#[derive(Clone)]
pub struct SurrealSettingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSettingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SettingRepository for SurrealSettingRepository<C> {
    async fn get(&self, tenant_id: Uuid, key: &TaxonomyKey) -> CanvassResult<Setting> {
        let id = record_key(tenant_id, key);

        let mut result = self
            .db
            .query(SELECT_BY_ID)
            .bind(("id", id.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SettingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("setting", key.as_str()))?;
        Ok(row.try_into_setting()?)
    }

    async fn list(&self, tenant_id: Uuid) -> CanvassResult<Vec<Setting>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM setting \
                 WHERE tenant_id = $tenant_id ORDER BY name ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SettingRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(SettingRow::try_into_setting)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn upsert(&self, input: UpsertSetting) -> CanvassResult<Setting> {
        let id = record_key(input.tenant_id, &input.key);

        let result = self
            .db
            .query(
                "UPSERT type::record('setting', $id) SET \
                 tenant_id = $tenant_id, name = $name, data = $data, \
                 file_path = $file_path, updated_at = time::now() \
                 RETURN NONE;",
            )
            .query(SELECT_BY_ID)
            .bind(("id", id.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("name", String::from(input.key)))
            .bind(("data", input.value))
            .bind(("file_path", input.file_path))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SettingRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("setting", id))?;
        Ok(row.try_into_setting()?)
    }

    async fn delete(&self, tenant_id: Uuid, key: &TaxonomyKey) -> CanvassResult<()> {
        let id = record_key(tenant_id, key);

        let result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id FROM type::record('setting', $id); \
                 DELETE type::record('setting', $id);",
            )
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let existing: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        if existing.is_empty() {
            return Err(not_found("setting", key.as_str()).into());
        }
        Ok(())
    }
}
