//! Mapping of domain errors onto HTTP responses.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use canvass_core::error::CanvassError;
use canvass_core::language::{DEFAULT_LANGUAGE, FallbackChain, fallback_chain};
use serde::Serialize;
use tracing::{error, warn};

use crate::messages;

/// Error type returned by every handler and extractor.
#[derive(Debug)]
pub struct ApiError(pub CanvassError);

/// Attached to error responses so the language middleware can render
/// the message in the caller's language.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub key: &'static str,
    /// Extra text shown after the catalog message (validation details).
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ErrorInfo {
    fn of(err: &CanvassError) -> Self {
        let detail = match err {
            CanvassError::Validation { message } => Some(message.clone()),
            _ => None,
        };
        Self {
            code: err.code(),
            key: err.message_key(),
            detail,
        }
    }

    /// Render the body for the given fallback chain.
    pub fn body(&self, chain: &FallbackChain) -> ErrorBody {
        let (text, _) = messages::localize(chain, self.key);
        let message = match &self.detail {
            Some(detail) if !text.is_empty() => format!("{text} ({detail})"),
            Some(detail) => detail.clone(),
            None => text.to_string(),
        };
        ErrorBody {
            error: self.code,
            message,
        }
    }
}

pub fn status_for(err: &CanvassError) -> StatusCode {
    match err {
        CanvassError::Validation { .. }
        | CanvassError::Conflict { .. }
        | CanvassError::PasswordMismatch
        | CanvassError::InvalidOrExpiredToken
        | CanvassError::TenantContext => StatusCode::BAD_REQUEST,
        CanvassError::InvalidCredentials
        | CanvassError::InactiveAccount
        | CanvassError::Unauthorized => StatusCode::UNAUTHORIZED,
        CanvassError::Forbidden { .. } => StatusCode::FORBIDDEN,
        CanvassError::NotFound { .. } => StatusCode::NOT_FOUND,
        CanvassError::DependencyFailure(_) => StatusCode::BAD_GATEWAY,
        CanvassError::Database(_) | CanvassError::Crypto(_) | CanvassError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => error!(error = %self.0, "request failed"),
            StatusCode::BAD_GATEWAY => warn!(error = %self.0, "upstream dependency failed"),
            _ => {}
        }

        let info = ErrorInfo::of(&self.0);
        let body = info.body(&fallback_chain(DEFAULT_LANGUAGE));
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(info);
        response
    }
}

impl From<CanvassError> for ApiError {
    fn from(err: CanvassError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CanvassError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(CanvassError::validation(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self(CanvassError::validation(err.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
