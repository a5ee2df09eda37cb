//! Response-safe projections of persisted entities.
//!
//! Password hashes and activation/reset token material never appear in
//! these types, whatever the caller asks for. API handlers serialize
//! projections, never the entities themselves.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::admin::Admin;
use crate::models::user::{AccountStatus, User};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "id")]
    pub public_id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub language: Option<String>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            public_id: user.public_id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            photo: user.photo_path.clone(),
            language: user.language.clone(),
            status: user.status,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
            created_at: admin.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_secrets() -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            public_id: "k3J9xQpL0aZb".into(),
            email: "ana@example.org".into(),
            name: "Ana".into(),
            phone: None,
            photo_path: Some("avatars/ana.png".into()),
            language: Some("es".into()),
            status: AccountStatus::Active,
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            activation_token_hash: Some("a".repeat(64)),
            activation_token_expires_at: Some(Utc::now()),
            reset_token_hash: Some("b".repeat(64)),
            reset_token_expires_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_profile_strips_credentials() {
        let user = user_with_secrets();
        let json = serde_json::to_string(&UserProfile::from(&user)).unwrap();

        assert!(!json.contains("argon2"));
        assert!(!json.contains(&"a".repeat(64)));
        assert!(!json.contains(&"b".repeat(64)));
        assert!(!json.contains("password"));
        assert!(!json.contains("token"));
        assert!(!json.contains(&user.id.to_string()));
    }

    #[test]
    fn user_profile_renames_fields() {
        let user = user_with_secrets();
        let value = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert_eq!(value["id"], "k3J9xQpL0aZb");
        assert_eq!(value["photo"], "avatars/ana.png");
        assert_eq!(value["status"], "Active");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn admin_profile_strips_credentials() {
        let admin = Admin {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            email: "root@example.org".into(),
            name: "Root".into(),
            password_hash: "$argon2id$secret".into(),
            status: AccountStatus::Active,
            reset_token_hash: Some("c".repeat(64)),
            reset_token_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&AdminProfile::from(&admin)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains(&"c".repeat(64)));
    }
}
