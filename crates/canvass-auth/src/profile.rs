//! Profile management for users, and the admin-facing user directory.

use canvass_core::delivery::FileStorage;
use canvass_core::error::{CanvassError, CanvassResult};
use canvass_core::language::parse_language_tag;
use canvass_core::models::user::{AccountStatus, UpdateUser, User};
use canvass_core::projection::UserProfile;
use canvass_core::repository::{PaginatedResult, Pagination, UserRepository};
use canvass_core::validation::{Validate, require_max_len, require_non_empty};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::AuthError;

/// Upper bound for profile photos.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

const PHOTO_NAMESPACE: &str = "avatars";

/// Editable profile fields. Nested options follow the repository
/// convention: `Some(None)` clears the field.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub language: Option<Option<String>>,
}

impl Validate for UpdateProfileInput {
    fn validate(&self) -> CanvassResult<()> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
            require_max_len("name", name, 100)?;
        }
        if let Some(Some(phone)) = &self.phone {
            require_max_len("phone", phone, 32)?;
        }
        if let Some(Some(language)) = &self.language
            && parse_language_tag(language).is_none()
        {
            return Err(CanvassError::validation(
                "language must be a 2-3 letter ISO 639-1 code",
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PhotoUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Validate for PhotoUpload {
    fn validate(&self) -> CanvassResult<()> {
        if !self.content_type.starts_with("image/") {
            return Err(CanvassError::validation("photo must be an image"));
        }
        if self.bytes.is_empty() {
            return Err(CanvassError::validation("photo is empty"));
        }
        if self.bytes.len() > MAX_PHOTO_BYTES {
            return Err(CanvassError::validation(format!(
                "photo must be at most {MAX_PHOTO_BYTES} bytes"
            )));
        }
        Ok(())
    }
}

pub struct ProfileService<U: UserRepository, F: FileStorage> {
    user_repo: U,
    storage: F,
}

impl<U: UserRepository, F: FileStorage> ProfileService<U, F> {
    pub fn new(user_repo: U, storage: F) -> Self {
        Self { user_repo, storage }
    }

    /// Load the account behind a session. Sessions issued before a
    /// deactivation stop working with it.
    async fn active_user(&self, tenant_id: Uuid, user_id: Uuid) -> CanvassResult<User> {
        let user = self.user_repo.get_by_id(tenant_id, user_id).await?;
        if user.status != AccountStatus::Active {
            return Err(AuthError::AccountInactive.into());
        }
        Ok(user)
    }

    pub async fn get_profile(&self, tenant_id: Uuid, user_id: Uuid) -> CanvassResult<UserProfile> {
        let user = self.active_user(tenant_id, user_id).await?;
        Ok(UserProfile::from(&user))
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> CanvassResult<UserProfile> {
        input.validate()?;
        self.active_user(tenant_id, user_id).await?;
        let user = self
            .user_repo
            .update(
                tenant_id,
                user_id,
                UpdateUser {
                    name: input.name.map(|n| n.trim().to_string()),
                    phone: input.phone,
                    language: input
                        .language
                        .map(|lang| lang.as_deref().and_then(parse_language_tag)),
                    ..Default::default()
                },
            )
            .await?;
        Ok(UserProfile::from(&user))
    }

    /// Store a new profile photo. The previous photo, if any, is
    /// removed afterwards; a failed removal is logged and ignored.
    #[instrument(skip(self, upload), fields(size = upload.bytes.len()))]
    pub async fn update_photo(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        upload: PhotoUpload,
    ) -> CanvassResult<UserProfile> {
        upload.validate()?;
        let user = self.active_user(tenant_id, user_id).await?;

        let path = self
            .storage
            .save(PHOTO_NAMESPACE, &upload.filename, upload.bytes)
            .await?;
        let updated = self
            .user_repo
            .update(
                tenant_id,
                user_id,
                UpdateUser {
                    photo_path: Some(Some(path)),
                    ..Default::default()
                },
            )
            .await?;

        if let Some(old) = user.photo_path {
            self.remove_file(&old).await;
        }
        Ok(UserProfile::from(&updated))
    }

    pub async fn get_by_public_id(
        &self,
        tenant_id: Uuid,
        public_id: &str,
    ) -> CanvassResult<UserProfile> {
        let user = self.user_repo.get_by_public_id(tenant_id, public_id).await?;
        Ok(UserProfile::from(&user))
    }

    pub async fn list_users(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> CanvassResult<PaginatedResult<UserProfile>> {
        let page = self.user_repo.list(tenant_id, pagination).await?;
        Ok(PaginatedResult {
            items: page.items.iter().map(UserProfile::from).collect(),
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    /// Resolve a public id to the internal account id.
    pub async fn resolve_public_id(&self, tenant_id: Uuid, public_id: &str) -> CanvassResult<Uuid> {
        Ok(self
            .user_repo
            .get_by_public_id(tenant_id, public_id)
            .await?
            .id)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, tenant_id: Uuid, public_id: &str) -> CanvassResult<()> {
        let user = self.user_repo.get_by_public_id(tenant_id, public_id).await?;
        self.user_repo.delete(tenant_id, user.id).await?;
        if let Some(photo) = user.photo_path {
            self.remove_file(&photo).await;
        }
        info!(user_id = %user.id, "user deleted");
        Ok(())
    }

    async fn remove_file(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path, error = %e, "failed to remove stored file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_validation() {
        let ok = PhotoUpload {
            filename: "me.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(ok.validate().is_ok());

        let pdf = PhotoUpload {
            content_type: "application/pdf".into(),
            ..ok
        };
        assert!(pdf.validate().is_err());

        let huge = PhotoUpload {
            filename: "big.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0; MAX_PHOTO_BYTES + 1],
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn profile_language_must_be_a_code() {
        let input = UpdateProfileInput {
            language: Some(Some("klingon".into())),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let clear = UpdateProfileInput {
            language: Some(None),
            ..Default::default()
        };
        assert!(clear.validate().is_ok());
    }
}
