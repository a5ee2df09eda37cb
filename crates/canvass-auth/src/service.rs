//! Account service: registration, activation, login and password
//! recovery for regular users.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use canvass_core::delivery::Mailer;
use canvass_core::error::{CanvassError, CanvassResult};
use canvass_core::language::parse_language_tag;
use canvass_core::models::user::{AccountStatus, CreateUser, UpdateUser};
use canvass_core::projection::UserProfile;
use canvass_core::repository::UserRepository;
use canvass_core::validation::{
    Validate, normalize_email, require_email, require_max_len, require_non_empty,
};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, SessionExtras, SessionRole, TokenPurpose};

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub tenant_id: Uuid,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub name: String,
    pub phone: Option<String>,
    pub language: Option<String>,
}

impl Validate for RegisterInput {
    fn validate(&self) -> CanvassResult<()> {
        require_email("email", &self.email)?;
        require_non_empty("name", &self.name)?;
        require_max_len("name", &self.name, 100)?;
        if let Some(phone) = &self.phone {
            require_max_len("phone", phone, 32)?;
        }
        if let Some(language) = &self.language
            && parse_language_tag(language).is_none()
        {
            return Err(CanvassError::validation(
                "language must be a 2-3 letter ISO 639-1 code",
            ));
        }
        Ok(())
    }
}

/// Result of a registration.
#[derive(Debug)]
pub struct RegisterOutput {
    pub profile: UserProfile,
    /// `false` when the account was created but the activation email
    /// could not be delivered.
    pub activation_email_sent: bool,
}

/// Input for the login flow (users and admins).
#[derive(Debug)]
pub struct LoginInput {
    pub tenant_id: Uuid,
    pub email: String,
    pub password: String,
}

/// Successful user login.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed session JWT.
    pub access_token: String,
    /// Session lifetime in seconds.
    pub expires_in: u64,
    pub profile: UserProfile,
}

/// Input for redeeming a password reset token (users and admins).
#[derive(Debug)]
pub struct ResetPasswordInput {
    pub tenant_id: Uuid,
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Input for an authenticated password change (users and admins).
#[derive(Debug)]
pub struct ChangePasswordInput {
    pub tenant_id: Uuid,
    pub account_id: Uuid,
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

/// 9 random bytes → 12 base64url characters.
pub(crate) fn generate_public_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 9] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Account service.
///
/// Generic over the repository and mailer so that the auth layer has
/// no dependency on the database or delivery crates.
pub struct AccountService<U: UserRepository, M: Mailer> {
    user_repo: U,
    mailer: M,
    config: AuthConfig,
}

impl<U: UserRepository, M: Mailer> AccountService<U, M> {
    pub fn new(user_repo: U, mailer: M, config: AuthConfig) -> Self {
        Self {
            user_repo,
            mailer,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create a pending account and email its activation token.
    ///
    /// A failed activation email does not undo the registration; the
    /// outcome is reported through [`RegisterOutput::activation_email_sent`].
    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn register(&self, input: RegisterInput) -> CanvassResult<RegisterOutput> {
        input.validate()?;
        password::check_new_password(
            &input.password,
            &input.password_confirmation,
            self.config.min_password_length,
        )?;

        let email = normalize_email(&input.email);
        match self.user_repo.get_by_email(input.tenant_id, &email).await {
            Ok(_) => {
                return Err(CanvassError::Conflict {
                    entity: "user".into(),
                    field: "email".into(),
                });
            }
            Err(CanvassError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;
        let activation = token::issue_token(TokenPurpose::Activation, &self.config, Utc::now());

        let user = self
            .user_repo
            .create(CreateUser {
                tenant_id: input.tenant_id,
                public_id: generate_public_id(),
                email,
                name: input.name.trim().to_string(),
                phone: input.phone,
                language: input.language.as_deref().and_then(parse_language_tag),
                password_hash,
                status: AccountStatus::Pending,
                activation_token_hash: Some(activation.hash.clone()),
                activation_token_expires_at: Some(activation.expires_at),
            })
            .await?;

        let activation_email_sent = match self
            .mailer
            .send_activation_email(&user.email, &activation.raw, &user.name)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "activation email not delivered");
                false
            }
        };

        info!(user_id = %user.id, "user registered");
        Ok(RegisterOutput {
            profile: UserProfile::from(&user),
            activation_email_sent,
        })
    }

    /// Redeem an activation token: `Pending → Active`, consuming the
    /// token in the same write.
    #[instrument(skip(self, raw_token))]
    pub async fn activate(&self, tenant_id: Uuid, raw_token: &str) -> CanvassResult<UserProfile> {
        let token_hash = token::hash_token(raw_token);
        let user = match self
            .user_repo
            .get_by_activation_token_hash(tenant_id, &token_hash)
            .await
        {
            Ok(u) => u,
            Err(CanvassError::NotFound { .. }) => return Err(AuthError::TokenInvalidOrExpired.into()),
            Err(e) => return Err(e),
        };

        let valid = token::verify_token(
            raw_token,
            user.activation_token_hash.as_deref(),
            TokenPurpose::Activation,
            user.activation_token_expires_at,
            Utc::now(),
        );
        if !valid || user.status != AccountStatus::Pending {
            return Err(AuthError::TokenInvalidOrExpired.into());
        }

        // Only one concurrent redemption matches the stored hash.
        let user = match self.user_repo.activate(tenant_id, user.id, &token_hash).await {
            Ok(u) => u,
            Err(CanvassError::NotFound { .. }) => return Err(AuthError::TokenInvalidOrExpired.into()),
            Err(e) => return Err(e),
        };

        info!(user_id = %user.id, "user activated");
        Ok(UserProfile::from(&user))
    }

    /// Authenticate with email + password and issue a session token.
    ///
    /// Unknown email and wrong password produce the same error.
    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn login(&self, input: LoginInput) -> CanvassResult<LoginOutput> {
        let pepper = self.config.pepper.as_deref();
        let email = normalize_email(&input.email);

        // 1. Look up user.
        let user = match self.user_repo.get_by_email(input.tenant_id, &email).await {
            Ok(u) => u,
            Err(CanvassError::NotFound { .. }) => {
                password::verify_dummy(&input.password, pepper);
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        // 2. Verify password.
        if !password::verify_password(&input.password, &user.password_hash, pepper)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Check account status.
        if user.status != AccountStatus::Active {
            return Err(AuthError::AccountInactive.into());
        }

        // 4. Issue session token.
        let access_token = token::issue_session_token(
            user.id,
            SessionExtras {
                tenant_id: input.tenant_id,
                role: SessionRole::User,
                lang: user.language.clone(),
            },
            &self.config,
        )?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutput {
            access_token,
            expires_in: self.config.session_lifetime_secs,
            profile: UserProfile::from(&user),
        })
    }

    /// Start password recovery.
    ///
    /// An unknown email is reported as success so that the endpoint
    /// does not reveal which addresses have accounts. A failed reset
    /// email for a known account is a [`CanvassError::DependencyFailure`].
    #[instrument(skip(self, email))]
    pub async fn forgot_password(&self, tenant_id: Uuid, email: &str) -> CanvassResult<()> {
        require_email("email", email)?;
        let email = normalize_email(email);

        let user = match self.user_repo.get_by_email(tenant_id, &email).await {
            Ok(u) => u,
            Err(CanvassError::NotFound { .. }) => {
                debug!("password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let reset = token::issue_token(TokenPurpose::PasswordReset, &self.config, Utc::now());
        self.user_repo
            .update(
                tenant_id,
                user.id,
                UpdateUser::reset_token(reset.hash.clone(), reset.expires_at),
            )
            .await?;

        self.mailer
            .send_password_reset_email(&user.email, &reset.raw, &user.name)
            .await
            .inspect_err(|e| warn!(user_id = %user.id, error = %e, "reset email not delivered"))?;

        info!(user_id = %user.id, "password reset issued");
        Ok(())
    }

    /// Redeem a reset token and set a new password. The token is
    /// cleared in the same write as the password.
    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn reset_password(&self, input: ResetPasswordInput) -> CanvassResult<()> {
        password::check_new_password(
            &input.password,
            &input.password_confirmation,
            self.config.min_password_length,
        )?;

        let token_hash = token::hash_token(&input.token);
        let user = match self
            .user_repo
            .get_by_reset_token_hash(input.tenant_id, &token_hash)
            .await
        {
            Ok(u) => u,
            Err(CanvassError::NotFound { .. }) => return Err(AuthError::TokenInvalidOrExpired.into()),
            Err(e) => return Err(e),
        };

        if !token::verify_token(
            &input.token,
            user.reset_token_hash.as_deref(),
            TokenPurpose::PasswordReset,
            user.reset_token_expires_at,
            Utc::now(),
        ) {
            return Err(AuthError::TokenInvalidOrExpired.into());
        }

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;
        match self
            .user_repo
            .redeem_reset_token(input.tenant_id, user.id, &token_hash, password_hash)
            .await
        {
            Ok(_) => {}
            Err(CanvassError::NotFound { .. }) => return Err(AuthError::TokenInvalidOrExpired.into()),
            Err(e) => return Err(e),
        }

        info!(user_id = %user.id, "password reset completed");
        Ok(())
    }

    /// Change the password of an authenticated user.
    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id, user_id = %input.account_id))]
    pub async fn change_password(&self, input: ChangePasswordInput) -> CanvassResult<()> {
        let user = self
            .user_repo
            .get_by_id(input.tenant_id, input.account_id)
            .await?;
        if user.status != AccountStatus::Active {
            return Err(AuthError::AccountInactive.into());
        }

        let pepper = self.config.pepper.as_deref();
        if !password::verify_password(&input.current_password, &user.password_hash, pepper)? {
            return Err(AuthError::InvalidCredentials.into());
        }
        password::check_new_password(
            &input.password,
            &input.password_confirmation,
            self.config.min_password_length,
        )?;

        let password_hash = password::hash_password(&input.password, pepper)?;
        self.user_repo
            .update_password(input.tenant_id, user.id, password_hash)
            .await?;
        Ok(())
    }

    /// `Active → Inactive`. Inactive accounts can no longer log in or
    /// use sessions issued earlier. Pending accounts cannot be
    /// deactivated.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, tenant_id: Uuid, user_id: Uuid) -> CanvassResult<UserProfile> {
        let user = self.user_repo.get_by_id(tenant_id, user_id).await?;
        match user.status {
            AccountStatus::Inactive => return Ok(UserProfile::from(&user)),
            AccountStatus::Pending => {
                return Err(CanvassError::validation(
                    "only active accounts can be deactivated",
                ));
            }
            AccountStatus::Active => {}
        }

        let user = self
            .user_repo
            .update(
                tenant_id,
                user_id,
                UpdateUser {
                    status: Some(AccountStatus::Inactive),
                    ..Default::default()
                },
            )
            .await?;

        info!(user_id = %user.id, "user deactivated");
        Ok(UserProfile::from(&user))
    }
}
