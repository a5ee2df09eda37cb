//! Canvass Database — SurrealDB connection management, schema
//! migrations and the repository implementations of the
//! `canvass-core` traits.

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{
    SurrealAdminRepository, SurrealDropdownRepository, SurrealSettingRepository,
    SurrealTenantRepository, SurrealUserRepository,
};
pub use schema::run_migrations;
