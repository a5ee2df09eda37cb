//! SurrealDB implementation of [`DropdownRepository`].
//!
//! The option's machine value is stored in the `code` column.

use std::collections::BTreeMap;

use canvass_core::error::CanvassResult;
use canvass_core::models::dropdown::{CreateDropdownOption, DropdownOption, UpdateDropdownOption};
use canvass_core::repository::DropdownRepository;
use canvass_core::taxonomy::TaxonomyKey;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{IdRow, not_found, parse_uuid};
use crate::error::DbError;

const SELECT_BY_ID: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('dropdown_option', $id) WHERE tenant_id = $tenant_id";

#[derive(Debug, SurrealValue)]
struct DropdownRow {
    record_id: String,
    tenant_id: String,
    kind: String,
    code: String,
    labels: serde_json::Value,
    sort_order: i64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct KindRow {
    kind: String,
}

impl DropdownRow {
    fn try_into_option(self) -> Result<DropdownOption, DbError> {
        let labels: BTreeMap<String, String> = serde_json::from_value(self.labels)
            .map_err(|e| DbError::Decode(format!("invalid labels: {e}")))?;
        Ok(DropdownOption {
            id: parse_uuid(&self.record_id, "dropdown option")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            kind: TaxonomyKey::try_from(self.kind)
                .map_err(|e| DbError::Decode(e.to_string()))?,
            value: self.code,
            labels,
            sort_order: i32::try_from(self.sort_order)
                .map_err(|e| DbError::Decode(format!("invalid sort order: {e}")))?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn labels_to_value(labels: BTreeMap<String, String>) -> Result<serde_json::Value, DbError> {
    serde_json::to_value(labels).map_err(|e| DbError::Query(format!("invalid labels: {e}")))
}

#[derive(Clone)]
pub struct SurrealDropdownRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDropdownRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DropdownRepository for SurrealDropdownRepository<C> {
    async fn create(&self, input: CreateDropdownOption) -> CanvassResult<DropdownOption> {
        let id_str = Uuid::new_v4().to_string();
        let labels = labels_to_value(input.labels)?;

        let result = self
            .db
            .query(
                "CREATE type::record('dropdown_option', $id) SET \
                 tenant_id = $tenant_id, kind = $kind, code = $code, \
                 labels = $labels, sort_order = $sort_order, \
                 active = $active RETURN NONE;",
            )
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("kind", String::from(input.kind)))
            .bind(("code", input.value))
            .bind(("labels", labels))
            .bind(("sort_order", i64::from(input.sort_order)))
            .bind(("active", input.active))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "dropdown option", "value"))?;

        let rows: Vec<DropdownRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("dropdown option", id_str))?;
        Ok(row.try_into_option()?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> CanvassResult<DropdownOption> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DropdownRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("dropdown option", id_str))?;
        Ok(row.try_into_option()?)
    }

    async fn get_by_value(
        &self,
        tenant_id: Uuid,
        kind: &TaxonomyKey,
        value: &str,
    ) -> CanvassResult<DropdownOption> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM dropdown_option \
                 WHERE tenant_id = $tenant_id AND kind = $kind AND code = $code \
                 LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("kind", kind.as_str().to_string()))
            .bind(("code", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DropdownRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("dropdown option", format!("{kind}/{value}")))?;
        Ok(row.try_into_option()?)
    }

    async fn list_by_kind(
        &self,
        tenant_id: Uuid,
        kind: &TaxonomyKey,
        include_inactive: bool,
    ) -> CanvassResult<Vec<DropdownOption>> {
        let filter = if include_inactive {
            ""
        } else {
            " AND active = true"
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM dropdown_option \
             WHERE tenant_id = $tenant_id AND kind = $kind{filter} \
             ORDER BY sort_order ASC, code ASC"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("kind", kind.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DropdownRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(DropdownRow::try_into_option)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_kinds(&self, tenant_id: Uuid) -> CanvassResult<Vec<TaxonomyKey>> {
        let mut result = self
            .db
            .query(
                "SELECT kind FROM dropdown_option \
                 WHERE tenant_id = $tenant_id GROUP BY kind ORDER BY kind ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<KindRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| TaxonomyKey::try_from(row.kind).map_err(|e| DbError::Decode(e.to_string())))
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDropdownOption,
    ) -> CanvassResult<DropdownOption> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.labels.is_some() {
            sets.push("labels = $labels");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('dropdown_option', $id) SET {} \
             WHERE tenant_id = $tenant_id RETURN NONE;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(labels) = input.labels {
            builder = builder.bind(("labels", labels_to_value(labels)?));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", i64::from(sort_order)));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DropdownRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("dropdown option", id_str))?;
        Ok(row.try_into_option()?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CanvassResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id \
                 FROM type::record('dropdown_option', $id) \
                 WHERE tenant_id = $tenant_id; \
                 DELETE type::record('dropdown_option', $id) \
                 WHERE tenant_id = $tenant_id;",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let existing: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        if existing.is_empty() {
            return Err(not_found("dropdown option", id_str).into());
        }
        Ok(())
    }
}
