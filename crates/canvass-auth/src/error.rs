//! Authentication error types.

use canvass_core::error::CanvassError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is not active")]
    AccountInactive,

    #[error("token is invalid or has expired")]
    TokenInvalidOrExpired,

    #[error("session has expired")]
    SessionExpired,

    #[error("invalid session: {0}")]
    SessionInvalid(String),

    #[error("password confirmation does not match")]
    PasswordMismatch,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for CanvassError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => CanvassError::InvalidCredentials,
            AuthError::AccountInactive => CanvassError::InactiveAccount,
            AuthError::TokenInvalidOrExpired => CanvassError::InvalidOrExpiredToken,
            AuthError::SessionExpired | AuthError::SessionInvalid(_) => CanvassError::Unauthorized,
            AuthError::PasswordMismatch => CanvassError::PasswordMismatch,
            AuthError::PasswordTooShort { .. } => CanvassError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => CanvassError::Crypto(msg),
        }
    }
}
