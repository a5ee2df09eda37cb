//! Error types for the Canvass platform.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvassError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity} with {field}")]
    Conflict { entity: String, field: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is not active")]
    InactiveAccount,

    #[error("Token is invalid or has expired")]
    InvalidOrExpiredToken,

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Delivery failed: {0}")]
    DependencyFailure(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied: {reason}")]
    Forbidden { reason: String },

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CanvassError {
    /// Shorthand for a [`CanvassError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InactiveAccount => "INACTIVE_ACCOUNT",
            Self::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DependencyFailure(_) => "DEPENDENCY_FAILURE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::TenantContext => "TENANT_CONTEXT",
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Key into the localized message catalog.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "errors.not_found",
            Self::Conflict { .. } => "errors.conflict",
            Self::InvalidCredentials => "errors.invalid_credentials",
            Self::InactiveAccount => "errors.inactive_account",
            Self::InvalidOrExpiredToken => "errors.invalid_or_expired_token",
            Self::PasswordMismatch => "errors.password_mismatch",
            Self::Validation { .. } => "errors.validation",
            Self::DependencyFailure(_) => "errors.dependency_failure",
            Self::Unauthorized => "errors.unauthorized",
            Self::Forbidden { .. } => "errors.forbidden",
            Self::TenantContext => "errors.tenant_context",
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_) => "errors.internal",
        }
    }

    /// Whether the display text may be shown to API callers verbatim.
    ///
    /// Infrastructure errors carry driver or crypto details and are
    /// replaced by the generic catalog message.
    pub fn is_public(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_) | Self::DependencyFailure(_)
        )
    }
}

pub type CanvassResult<T> = Result<T, CanvassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_share_no_detail() {
        // Unknown email and wrong password surface as the same variant.
        let a = CanvassError::InvalidCredentials;
        let b = CanvassError::InvalidCredentials;
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.code(), "INVALID_CREDENTIALS");
    }

    #[test]
    fn infrastructure_errors_are_not_public() {
        assert!(!CanvassError::Database("boom".into()).is_public());
        assert!(!CanvassError::Crypto("bad key".into()).is_public());
        assert!(CanvassError::PasswordMismatch.is_public());
        assert_eq!(CanvassError::Internal("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn validation_helper_builds_message() {
        let err = CanvassError::validation("email is required");
        assert_eq!(err.to_string(), "Validation error: email is required");
        assert_eq!(err.message_key(), "errors.validation");
    }
}
