//! SurrealDB implementation of [`AdminRepository`].

use canvass_core::error::CanvassResult;
use canvass_core::models::admin::{Admin, CreateAdmin, UpdateAdmin};
use canvass_core::models::user::AccountStatus;
use canvass_core::repository::AdminRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::user::parse_status;
use super::{IdRow, not_found, parse_uuid};
use crate::error::DbError;

const SELECT_BY_ID: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('admin', $id) WHERE tenant_id = $tenant_id";

#[derive(Debug, SurrealValue)]
struct AdminRow {
    record_id: String,
    tenant_id: String,
    email: String,
    name: String,
    password_hash: String,
    status: String,
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AdminRow {
    fn try_into_admin(self) -> Result<Admin, DbError> {
        Ok(Admin {
            id: parse_uuid(&self.record_id, "admin")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            status: parse_status(&self.status)?,
            reset_token_hash: self.reset_token_hash,
            reset_token_expires_at: self.reset_token_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn first_admin(rows: Vec<AdminRow>, id: impl Into<String>) -> Result<Admin, DbError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| not_found("admin", id))?
        .try_into_admin()
}

#[derive(Clone)]
pub struct SurrealAdminRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAdminRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AdminRepository for SurrealAdminRepository<C> {
    async fn create(&self, input: CreateAdmin) -> CanvassResult<Admin> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('admin', $id) SET \
                 tenant_id = $tenant_id, email = $email, name = $name, \
                 password_hash = $password_hash, status = $status, \
                 reset_token_hash = NONE, reset_token_expires_at = NONE \
                 RETURN NONE;",
            )
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("password_hash", input.password_hash))
            .bind(("status", AccountStatus::Active.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "admin", "email"))?;

        let rows: Vec<AdminRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_admin(rows, id_str)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> CanvassResult<Admin> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_admin(rows, id_str)?)
    }

    async fn get_by_email(&self, tenant_id: Uuid, email: &str) -> CanvassResult<Admin> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM admin \
                 WHERE tenant_id = $tenant_id AND email = $email LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_admin(rows, format!("email={email}"))?)
    }

    async fn get_by_reset_token_hash(
        &self,
        tenant_id: Uuid,
        token_hash: &str,
    ) -> CanvassResult<Admin> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM admin \
                 WHERE tenant_id = $tenant_id AND reset_token_hash = $hash LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_admin(rows, "reset_token")?)
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateAdmin) -> CanvassResult<Admin> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.reset_token_hash.is_some() {
            sets.push("reset_token_hash = $reset_token_hash");
        }
        if input.reset_token_expires_at.is_some() {
            sets.push("reset_token_expires_at = $reset_token_expires_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('admin', $id) SET {} \
             WHERE tenant_id = $tenant_id RETURN NONE;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(hash) = input.reset_token_hash {
            builder = builder.bind(("reset_token_hash", hash));
        }
        if let Some(expires_at) = input.reset_token_expires_at {
            builder = builder.bind(("reset_token_expires_at", expires_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AdminRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_admin(rows, id_str)?)
    }

    async fn update_password(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        password_hash: String,
    ) -> CanvassResult<Admin> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('admin', $id) SET \
                 password_hash = $password_hash, \
                 reset_token_hash = NONE, reset_token_expires_at = NONE, \
                 updated_at = time::now() \
                 WHERE tenant_id = $tenant_id RETURN NONE;",
            )
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AdminRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_admin(rows, id_str)?)
    }

    async fn redeem_reset_token(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        token_hash: &str,
        password_hash: String,
    ) -> CanvassResult<Admin> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('admin', $id) SET \
                 password_hash = $password_hash, \
                 reset_token_hash = NONE, reset_token_expires_at = NONE, \
                 updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND reset_token_hash = $token_hash \
                 RETURN meta::id(id) AS record_id;",
            )
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("token_hash", token_hash.to_string()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let updated: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        if updated.is_empty() {
            return Err(not_found("admin", format!("reset_token_hash={token_hash}")).into());
        }
        let rows: Vec<AdminRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_admin(rows, id_str)?)
    }
}
