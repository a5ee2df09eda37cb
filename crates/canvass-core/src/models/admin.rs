//! Admin domain model.
//!
//! Admins live in their own table and never share credentials with
//! regular users. They have no activation step: an admin is created
//! `Active` by the bootstrap routine or another admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::AccountStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAdmin {
    pub tenant_id: Uuid,
    pub email: String,
    pub name: String,
    /// Already-hashed password (PHC string).
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAdmin {
    pub name: Option<String>,
    pub status: Option<AccountStatus>,
    pub reset_token_hash: Option<Option<String>>,
    pub reset_token_expires_at: Option<Option<DateTime<Utc>>>,
}
