//! SurrealDB implementation of [`UserRepository`].
//!
//! Token columns hold SHA-256 hex digests only; the raw credential is
//! never handed to this layer.

use canvass_core::error::CanvassResult;
use canvass_core::models::user::{AccountStatus, CreateUser, UpdateUser, User};
use canvass_core::repository::{PaginatedResult, Pagination, UserRepository};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, IdRow, not_found, parse_uuid};
use crate::error::DbError;

const SELECT_BY_ID: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('user', $id) WHERE tenant_id = $tenant_id";

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    tenant_id: String,
    public_id: String,
    email: String,
    name: String,
    phone: Option<String>,
    photo_path: Option<String>,
    language: Option<String>,
    status: String,
    password_hash: String,
    activation_token_hash: Option<String>,
    activation_token_expires_at: Option<DateTime<Utc>>,
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(super) fn parse_status(s: &str) -> Result<AccountStatus, DbError> {
    AccountStatus::parse(s).ok_or_else(|| DbError::Decode(format!("unknown account status: {s}")))
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            public_id: self.public_id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            photo_path: self.photo_path,
            language: self.language,
            status: parse_status(&self.status)?,
            password_hash: self.password_hash,
            activation_token_hash: self.activation_token_hash,
            activation_token_expires_at: self.activation_token_expires_at,
            reset_token_hash: self.reset_token_hash,
            reset_token_expires_at: self.reset_token_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        tenant_id: Uuid,
        column: &'static str,
        value: &str,
    ) -> Result<User, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE tenant_id = $tenant_id AND {column} = $value LIMIT 1"
        );
        let mut result = self
            .db
            .query(&query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("value", value.to_string()))
            .await?;

        let rows: Vec<UserRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| not_found("user", format!("{column}={value}")))?
            .try_into_user()
    }

    /// Apply `sets` only while `guard` still holds. The token is part of
    /// the guard, so of two concurrent redemptions only one matches.
    async fn conditional_write(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        sets: &str,
        guard: &str,
        token_hash: &str,
        password_hash: Option<String>,
    ) -> CanvassResult<User> {
        let id_str = id.to_string();
        let query = format!(
            "UPDATE type::record('user', $id) SET {sets}, updated_at = time::now() \
             WHERE tenant_id = $tenant_id AND {guard} \
             RETURN meta::id(id) AS record_id;"
        );

        let mut builder = self
            .db
            .query(&query)
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("token_hash", token_hash.to_string()))
            .bind(("active", AccountStatus::Active.as_str().to_string()))
            .bind(("pending", AccountStatus::Pending.as_str().to_string()));
        if let Some(password_hash) = password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let updated: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        if updated.is_empty() {
            return Err(not_found("user", format!("token_hash={token_hash}")).into());
        }
        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("user", id_str))?;
        Ok(row.try_into_user()?)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> CanvassResult<User> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 tenant_id = $tenant_id, public_id = $public_id, \
                 email = $email, name = $name, phone = $phone, \
                 photo_path = NONE, language = $language, \
                 status = $status, password_hash = $password_hash, \
                 activation_token_hash = $activation_token_hash, \
                 activation_token_expires_at = $activation_token_expires_at, \
                 reset_token_hash = NONE, reset_token_expires_at = NONE \
                 RETURN NONE;",
            )
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("public_id", input.public_id))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("phone", input.phone))
            .bind(("language", input.language))
            .bind(("status", input.status.as_str().to_string()))
            .bind(("password_hash", input.password_hash))
            .bind(("activation_token_hash", input.activation_token_hash))
            .bind((
                "activation_token_expires_at",
                input.activation_token_expires_at,
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "user", "email"))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("user", id_str))?;
        Ok(row.try_into_user()?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> CanvassResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_BY_ID)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("user", id_str))?;
        Ok(row.try_into_user()?)
    }

    async fn get_by_public_id(&self, tenant_id: Uuid, public_id: &str) -> CanvassResult<User> {
        Ok(self.find_one(tenant_id, "public_id", public_id).await?)
    }

    async fn get_by_email(&self, tenant_id: Uuid, email: &str) -> CanvassResult<User> {
        Ok(self.find_one(tenant_id, "email", email).await?)
    }

    async fn get_by_activation_token_hash(
        &self,
        tenant_id: Uuid,
        token_hash: &str,
    ) -> CanvassResult<User> {
        Ok(self
            .find_one(tenant_id, "activation_token_hash", token_hash)
            .await?)
    }

    async fn get_by_reset_token_hash(
        &self,
        tenant_id: Uuid,
        token_hash: &str,
    ) -> CanvassResult<User> {
        Ok(self
            .find_one(tenant_id, "reset_token_hash", token_hash)
            .await?)
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateUser) -> CanvassResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.photo_path.is_some() {
            sets.push("photo_path = $photo_path");
        }
        if input.language.is_some() {
            sets.push("language = $language");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.activation_token_hash.is_some() {
            sets.push("activation_token_hash = $activation_token_hash");
        }
        if input.activation_token_expires_at.is_some() {
            sets.push("activation_token_expires_at = $activation_token_expires_at");
        }
        if input.reset_token_hash.is_some() {
            sets.push("reset_token_hash = $reset_token_hash");
        }
        if input.reset_token_expires_at.is_some() {
            sets.push("reset_token_expires_at = $reset_token_expires_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {} \
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
        // Nested options: Some(None) binds NONE and clears the column.
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(photo_path) = input.photo_path {
            builder = builder.bind(("photo_path", photo_path));
        }
        if let Some(language) = input.language {
            builder = builder.bind(("language", language));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(hash) = input.activation_token_hash {
            builder = builder.bind(("activation_token_hash", hash));
        }
        if let Some(expires_at) = input.activation_token_expires_at {
            builder = builder.bind(("activation_token_expires_at", expires_at));
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
            .map_err(|e| DbError::from_check(e, "user", "email"))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("user", id_str))?;
        Ok(row.try_into_user()?)
    }

    async fn update_password(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        password_hash: String,
    ) -> CanvassResult<User> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
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

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found("user", id_str))?;
        Ok(row.try_into_user()?)
    }

    async fn activate(&self, tenant_id: Uuid, id: Uuid, token_hash: &str) -> CanvassResult<User> {
        self.conditional_write(
            tenant_id,
            id,
            "status = $active, \
             activation_token_hash = NONE, activation_token_expires_at = NONE",
            "activation_token_hash = $token_hash AND status = $pending",
            token_hash,
            None,
        )
        .await
    }

    async fn redeem_reset_token(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        token_hash: &str,
        password_hash: String,
    ) -> CanvassResult<User> {
        self.conditional_write(
            tenant_id,
            id,
            "password_hash = $password_hash, \
             reset_token_hash = NONE, reset_token_expires_at = NONE",
            "reset_token_hash = $token_hash",
            token_hash,
            Some(password_hash),
        )
        .await
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CanvassResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id FROM type::record('user', $id) \
                 WHERE tenant_id = $tenant_id; \
                 DELETE type::record('user', $id) WHERE tenant_id = $tenant_id;",
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
            return Err(not_found("user", id_str).into());
        }
        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> CanvassResult<PaginatedResult<User>> {
        let tenant_id_str = tenant_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE tenant_id = $tenant_id GROUP ALL; \
                 SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset;",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserRow::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
