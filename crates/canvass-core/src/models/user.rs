//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an account. Only `Active` accounts authenticate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountStatus {
    Pending,
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "Pending",
            AccountStatus::Active => "Active",
            AccountStatus::Inactive => "Inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(AccountStatus::Pending),
            "Active" => Some(AccountStatus::Active),
            "Inactive" => Some(AccountStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Short opaque identifier exposed to API callers instead of `id`.
    pub public_id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    /// Storage path of the profile photo, if one was uploaded.
    pub photo_path: Option<String>,
    /// Preferred language (ISO 639-1).
    pub language: Option<String>,
    pub status: AccountStatus,
    pub password_hash: String,
    /// SHA-256 hex of the pending activation token.
    pub activation_token_hash: Option<String>,
    pub activation_token_expires_at: Option<DateTime<Utc>>,
    /// SHA-256 hex of the pending password-reset token.
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub tenant_id: Uuid,
    pub public_id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub language: Option<String>,
    /// Already-hashed password (PHC string).
    pub password_hash: String,
    pub status: AccountStatus,
    pub activation_token_hash: Option<String>,
    pub activation_token_expires_at: Option<DateTime<Utc>>,
}

/// Partial update. For the nested options, `Some(None)` clears the
/// column and `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub photo_path: Option<Option<String>>,
    pub language: Option<Option<String>>,
    pub status: Option<AccountStatus>,
    pub activation_token_hash: Option<Option<String>>,
    pub activation_token_expires_at: Option<Option<DateTime<Utc>>>,
    pub reset_token_hash: Option<Option<String>>,
    pub reset_token_expires_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateUser {
    /// Store a pending reset credential.
    pub fn reset_token(hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            reset_token_hash: Some(Some(hash)),
            reset_token_expires_at: Some(Some(expires_at)),
            ..Default::default()
        }
    }
}
