//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "accounts",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "catalog",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: tenants and accounts
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;

-- =======================================================================
-- Users (tenant scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE string;
DEFINE FIELD public_id ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD phone ON TABLE user TYPE option<string>;
DEFINE FIELD photo_path ON TABLE user TYPE option<string>;
DEFINE FIELD language ON TABLE user TYPE option<string>;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Pending', 'Active', 'Inactive'];
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD activation_token_hash ON TABLE user TYPE option<string>;
DEFINE FIELD activation_token_expires_at ON TABLE user \
    TYPE option<datetime>;
DEFINE FIELD reset_token_hash ON TABLE user TYPE option<string>;
DEFINE FIELD reset_token_expires_at ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_tenant_email ON TABLE user \
    COLUMNS tenant_id, email UNIQUE;
DEFINE INDEX idx_user_tenant_public_id ON TABLE user \
    COLUMNS tenant_id, public_id UNIQUE;
DEFINE INDEX idx_user_activation_token ON TABLE user \
    COLUMNS activation_token_hash;
DEFINE INDEX idx_user_reset_token ON TABLE user \
    COLUMNS reset_token_hash;

-- =======================================================================
-- Admins (tenant scope)
-- =======================================================================
DEFINE TABLE admin SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE admin TYPE string;
DEFINE FIELD email ON TABLE admin TYPE string;
DEFINE FIELD name ON TABLE admin TYPE string;
DEFINE FIELD password_hash ON TABLE admin TYPE string;
DEFINE FIELD status ON TABLE admin TYPE string \
    ASSERT $value IN ['Pending', 'Active', 'Inactive'];
DEFINE FIELD reset_token_hash ON TABLE admin TYPE option<string>;
DEFINE FIELD reset_token_expires_at ON TABLE admin TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE admin TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE admin TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_admin_tenant_email ON TABLE admin \
    COLUMNS tenant_id, email UNIQUE;
DEFINE INDEX idx_admin_reset_token ON TABLE admin \
    COLUMNS reset_token_hash;
";

// -----------------------------------------------------------------------
// Schema v2: dropdowns and settings
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
-- =======================================================================
-- Dropdown options (tenant scope, grouped by taxonomy key)
-- =======================================================================
DEFINE TABLE dropdown_option SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE dropdown_option TYPE string;
DEFINE FIELD kind ON TABLE dropdown_option TYPE string;
DEFINE FIELD code ON TABLE dropdown_option TYPE string;
DEFINE FIELD labels ON TABLE dropdown_option TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD sort_order ON TABLE dropdown_option TYPE int DEFAULT 0;
DEFINE FIELD active ON TABLE dropdown_option TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE dropdown_option TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE dropdown_option TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_dropdown_tenant_kind_code ON TABLE dropdown_option \
    COLUMNS tenant_id, kind, code UNIQUE;

-- =======================================================================
-- Settings (tenant scope, record id = <tenant_id>/<name>)
-- =======================================================================
DEFINE TABLE setting SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE setting TYPE string;
DEFINE FIELD name ON TABLE setting TYPE string;
DEFINE FIELD data ON TABLE setting TYPE any;
DEFINE FIELD file_path ON TABLE setting TYPE option<string>;
DEFINE FIELD updated_at ON TABLE setting TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_setting_tenant_name ON TABLE setting \
    COLUMNS tenant_id, name UNIQUE;
";

/// Run all pending migrations against the given database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}
