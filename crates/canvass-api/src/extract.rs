//! Request extractors: tenant context, sessions, taxonomy keys, ids and
//! JSON bodies with API-shaped rejections.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequest, FromRequestParts, OptionalFromRequestParts, RawPathParams};
use axum::http::request::Parts;
use canvass_auth::token::decode_session_token;
use canvass_auth::{AuthConfig, SessionClaims, SessionRole};
use canvass_core::delivery::{FileStorage, Mailer};
use canvass_core::error::CanvassError;
use canvass_core::repository::TenantRepository;
use canvass_core::taxonomy::TaxonomyKey;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::language::bearer_token;
use crate::state::AppState;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// JSON body whose rejections render as `VALIDATION_ERROR`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections render as `VALIDATION_ERROR`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Tenant named by the `X-Tenant-Id` header; the tenant must exist.
#[derive(Debug, Clone, Copy)]
pub struct TenantId(pub Uuid);

impl<M, F> FromRequestParts<AppState<M, F>> for TenantId
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<M, F>) -> ApiResult<Self> {
        let id = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(ApiError(CanvassError::TenantContext))?;

        match state.tenants.get_by_id(id).await {
            Ok(tenant) => Ok(Self(tenant.id)),
            Err(CanvassError::NotFound { .. }) => Err(ApiError(CanvassError::TenantContext)),
            Err(e) => Err(e.into()),
        }
    }
}

fn session(parts: &Parts, auth: &AuthConfig, expected: SessionRole) -> ApiResult<(Uuid, Uuid)> {
    let token = bearer_token(&parts.headers).ok_or(ApiError(CanvassError::Unauthorized))?;
    let claims: SessionClaims = decode_session_token(token, auth).map_err(|e| {
        debug!(error = %e, "session token rejected");
        ApiError(CanvassError::Unauthorized)
    })?;

    if claims.role != expected {
        return Err(ApiError(CanvassError::Forbidden {
            reason: format!("{expected:?} session required").to_lowercase(),
        }));
    }
    let subject = claims
        .subject_id()
        .map_err(|_| ApiError(CanvassError::Unauthorized))?;
    let tenant = claims
        .tenant()
        .map_err(|_| ApiError(CanvassError::Unauthorized))?;
    Ok((subject, tenant))
}

/// An authenticated end user.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AuthConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> ApiResult<Self> {
        let auth = Arc::<AuthConfig>::from_ref(state);
        let (user_id, tenant_id) = session(parts, &auth, SessionRole::User)?;
        Ok(Self { user_id, tenant_id })
    }
}

/// An authenticated tenant administrator.
#[derive(Debug, Clone, Copy)]
pub struct AuthAdmin {
    pub admin_id: Uuid,
    pub tenant_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthAdmin
where
    Arc<AuthConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> ApiResult<Self> {
        let auth = Arc::<AuthConfig>::from_ref(state);
        let (admin_id, tenant_id) = session(parts, &auth, SessionRole::Admin)?;
        Ok(Self {
            admin_id,
            tenant_id,
        })
    }
}

/// No `Authorization` header yields `None`; a header that does not
/// carry a valid admin session is still rejected.
impl<S> OptionalFromRequestParts<S> for AuthAdmin
where
    Arc<AuthConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> ApiResult<Option<Self>> {
        if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
            return Ok(None);
        }
        <Self as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

async fn path_param<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
    names: &[&str],
) -> ApiResult<String> {
    let params = RawPathParams::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError(CanvassError::validation(e.body_text())))?;
    params
        .iter()
        .find(|(name, _)| names.contains(name))
        .map(|(_, value)| value.to_string())
        .ok_or_else(|| {
            ApiError(CanvassError::Internal(format!(
                "route declares none of the path parameters {names:?}"
            )))
        })
}

/// The `{kind}` or `{key}` path segment, validated and normalized.
/// Invalid keys are rejected with 400 before the handler runs.
#[derive(Debug, Clone)]
pub struct ValidTaxonomyKey(pub TaxonomyKey);

impl<S: Send + Sync> FromRequestParts<S> for ValidTaxonomyKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> ApiResult<Self> {
        let raw = path_param(parts, state, &["kind", "key"]).await?;
        Ok(Self(TaxonomyKey::parse(&raw)?))
    }
}

/// The `{id}` path segment as a UUID.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for PathId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> ApiResult<Self> {
        let raw = path_param(parts, state, &["id"]).await?;
        Uuid::parse_str(&raw)
            .map(Self)
            .map_err(|_| ApiError(CanvassError::validation(format!("invalid id '{raw}'"))))
    }
}
