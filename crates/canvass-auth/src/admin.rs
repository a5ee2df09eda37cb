//! Admin authentication service.
//!
//! Mirrors the user flows with two differences: admins are created
//! `Active` (no activation step), and `forgot_password` reports an
//! unknown email as `NotFound` instead of absorbing it.

use canvass_core::delivery::Mailer;
use canvass_core::error::{CanvassError, CanvassResult};
use canvass_core::models::admin::{CreateAdmin, UpdateAdmin};
use canvass_core::models::user::AccountStatus;
use canvass_core::projection::AdminProfile;
use canvass_core::repository::AdminRepository;
use canvass_core::validation::{
    Validate, normalize_email, require_email, require_max_len, require_non_empty,
};
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::service::{ChangePasswordInput, LoginInput, ResetPasswordInput};
use crate::token::{self, SessionExtras, SessionRole, TokenPurpose};

#[derive(Debug)]
pub struct CreateAdminInput {
    pub tenant_id: Uuid,
    pub email: String,
    pub name: String,
    pub password: String,
}

impl Validate for CreateAdminInput {
    fn validate(&self) -> CanvassResult<()> {
        require_email("email", &self.email)?;
        require_non_empty("name", &self.name)?;
        require_max_len("name", &self.name, 100)
    }
}

/// Successful admin login.
#[derive(Debug)]
pub struct AdminLoginOutput {
    pub access_token: String,
    pub expires_in: u64,
    pub profile: AdminProfile,
}

pub struct AdminAuthService<A: AdminRepository, M: Mailer> {
    admin_repo: A,
    mailer: M,
    config: AuthConfig,
}

impl<A: AdminRepository, M: Mailer> AdminAuthService<A, M> {
    pub fn new(admin_repo: A, mailer: M, config: AuthConfig) -> Self {
        Self {
            admin_repo,
            mailer,
            config,
        }
    }

    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn create_admin(&self, input: CreateAdminInput) -> CanvassResult<AdminProfile> {
        input.validate()?;
        password::check_new_password(
            &input.password,
            &input.password,
            self.config.min_password_length,
        )?;

        let email = normalize_email(&input.email);
        match self.admin_repo.get_by_email(input.tenant_id, &email).await {
            Ok(_) => {
                return Err(CanvassError::Conflict {
                    entity: "admin".into(),
                    field: "email".into(),
                });
            }
            Err(CanvassError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;
        let admin = self
            .admin_repo
            .create(CreateAdmin {
                tenant_id: input.tenant_id,
                email,
                name: input.name.trim().to_string(),
                password_hash,
            })
            .await?;

        info!(admin_id = %admin.id, "admin created");
        Ok(AdminProfile::from(&admin))
    }

    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn login(&self, input: LoginInput) -> CanvassResult<AdminLoginOutput> {
        let pepper = self.config.pepper.as_deref();
        let email = normalize_email(&input.email);

        let admin = match self.admin_repo.get_by_email(input.tenant_id, &email).await {
            Ok(a) => a,
            Err(CanvassError::NotFound { .. }) => {
                password::verify_dummy(&input.password, pepper);
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if !password::verify_password(&input.password, &admin.password_hash, pepper)? {
            return Err(AuthError::InvalidCredentials.into());
        }
        if admin.status != AccountStatus::Active {
            return Err(AuthError::AccountInactive.into());
        }

        let access_token = token::issue_session_token(
            admin.id,
            SessionExtras {
                tenant_id: input.tenant_id,
                role: SessionRole::Admin,
                lang: None,
            },
            &self.config,
        )?;

        info!(admin_id = %admin.id, "admin logged in");
        Ok(AdminLoginOutput {
            access_token,
            expires_in: self.config.session_lifetime_secs,
            profile: AdminProfile::from(&admin),
        })
    }

    /// Issue a reset token for an admin. Unknown emails are `NotFound`.
    #[instrument(skip(self, email))]
    pub async fn forgot_password(&self, tenant_id: Uuid, email: &str) -> CanvassResult<()> {
        require_email("email", email)?;
        let email = normalize_email(email);
        let admin = self.admin_repo.get_by_email(tenant_id, &email).await?;

        let reset = token::issue_token(TokenPurpose::PasswordReset, &self.config, Utc::now());
        self.admin_repo
            .update(
                tenant_id,
                admin.id,
                UpdateAdmin {
                    reset_token_hash: Some(Some(reset.hash.clone())),
                    reset_token_expires_at: Some(Some(reset.expires_at)),
                    ..Default::default()
                },
            )
            .await?;

        self.mailer
            .send_password_reset_email(&admin.email, &reset.raw, &admin.name)
            .await
            .inspect_err(|e| warn!(admin_id = %admin.id, error = %e, "reset email not delivered"))?;

        info!(admin_id = %admin.id, "admin password reset issued");
        Ok(())
    }

    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn reset_password(&self, input: ResetPasswordInput) -> CanvassResult<()> {
        password::check_new_password(
            &input.password,
            &input.password_confirmation,
            self.config.min_password_length,
        )?;

        let token_hash = token::hash_token(&input.token);
        let admin = match self
            .admin_repo
            .get_by_reset_token_hash(input.tenant_id, &token_hash)
            .await
        {
            Ok(a) => a,
            Err(CanvassError::NotFound { .. }) => return Err(AuthError::TokenInvalidOrExpired.into()),
            Err(e) => return Err(e),
        };

        if !token::verify_token(
            &input.token,
            admin.reset_token_hash.as_deref(),
            TokenPurpose::PasswordReset,
            admin.reset_token_expires_at,
            Utc::now(),
        ) {
            return Err(AuthError::TokenInvalidOrExpired.into());
        }

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;
        match self
            .admin_repo
            .redeem_reset_token(input.tenant_id, admin.id, &token_hash, password_hash)
            .await
        {
            Ok(_) => {}
            Err(CanvassError::NotFound { .. }) => return Err(AuthError::TokenInvalidOrExpired.into()),
            Err(e) => return Err(e),
        }

        info!(admin_id = %admin.id, "admin password reset completed");
        Ok(())
    }

    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id, admin_id = %input.account_id))]
    pub async fn change_password(&self, input: ChangePasswordInput) -> CanvassResult<()> {
        let admin = self
            .admin_repo
            .get_by_id(input.tenant_id, input.account_id)
            .await?;
        if admin.status != AccountStatus::Active {
            return Err(AuthError::AccountInactive.into());
        }

        let pepper = self.config.pepper.as_deref();
        if !password::verify_password(&input.current_password, &admin.password_hash, pepper)? {
            return Err(AuthError::InvalidCredentials.into());
        }
        password::check_new_password(
            &input.password,
            &input.password_confirmation,
            self.config.min_password_length,
        )?;

        let password_hash = password::hash_password(&input.password, pepper)?;
        self.admin_repo
            .update_password(input.tenant_id, admin.id, password_hash)
            .await?;
        Ok(())
    }
}
