//! Database-specific error types and conversions.

use canvass_core::error::CanvassError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity}: {field} already taken")]
    Duplicate { entity: String, field: String },
}

impl DbError {
    /// Classify an error raised by `Response::check()`. Unique index
    /// violations become [`DbError::Duplicate`].
    pub(crate) fn from_check(err: surrealdb::Error, entity: &str, field: &str) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
                field: field.into(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for CanvassError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CanvassError::NotFound { entity, id },
            DbError::Duplicate { entity, field } => CanvassError::Conflict { entity, field },
            other => CanvassError::Database(other.to_string()),
        }
    }
}
