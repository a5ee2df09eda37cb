//! SurrealDB repository implementations.
//!
//! Rows are always selected with `meta::id(id) AS record_id` so a
//! single row struct per table covers every query. Writes are followed
//! by a `SELECT` in the same request and the repositories read the
//! result of that second statement.

mod admin;
mod dropdown;
mod setting;
mod tenant;
mod user;

pub use admin::SurrealAdminRepository;
pub use dropdown::SurrealDropdownRepository;
pub use setting::SurrealSettingRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Row struct for existence probes issued ahead of a delete.
#[derive(Debug, SurrealValue)]
struct IdRow {
    #[allow(dead_code)]
    record_id: String,
}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn not_found(entity: &str, id: impl Into<String>) -> DbError {
    DbError::NotFound {
        entity: entity.into(),
        id: id.into(),
    }
}
