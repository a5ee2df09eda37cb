//! Administrator sign-in and the tenant user directory.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use canvass_auth::{ChangePasswordInput, LoginInput, ResetPasswordInput};
use canvass_core::delivery::{FileStorage, Mailer};
use canvass_core::projection::{AdminProfile, UserProfile};
use canvass_core::repository::Pagination;
use serde::{Deserialize, Serialize};

use super::auth::{
    ChangePasswordRequest, EmailRequest, LoginRequest, ResetPasswordRequest, SessionResponse,
    UserEnvelope,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, AuthAdmin, TenantId};
use crate::state::AppState;

const MAX_PAGE_SIZE: u64 = 200;

pub async fn login<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<SessionResponse<AdminProfile>>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let output = state
        .admins
        .login(LoginInput {
            tenant_id,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(SessionResponse {
        access_token: output.access_token,
        token_type: "Bearer",
        expires_in: output.expires_in,
        user: output.profile,
    }))
}

/// Unknown emails are reported as 404 for administrators.
pub async fn forgot_password<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    ApiJson(body): ApiJson<EmailRequest>,
) -> ApiResult<StatusCode>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    state.admins.forgot_password(tenant_id, &body.email).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn reset_password<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> ApiResult<StatusCode>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    state
        .admins
        .reset_password(ResetPasswordInput {
            tenant_id,
            token: body.token,
            password: body.password,
            password_confirmation: body.password_confirmation,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<StatusCode>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    state
        .admins
        .change_password(ChangePasswordInput {
            tenant_id: session.tenant_id,
            account_id: session.admin_id,
            current_password: body.current_password,
            password: body.password,
            password_confirmation: body.password_confirmation,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination {
            offset: self.offset.unwrap_or(default.offset),
            limit: self.limit.unwrap_or(default.limit).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub items: Vec<UserProfile>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub async fn list_users<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<UserPage>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let page = state
        .profiles
        .list_users(session.tenant_id, query.pagination())
        .await?;
    Ok(Json(UserPage {
        items: page.items,
        total: page.total,
        offset: page.offset,
        limit: page.limit,
    }))
}

pub async fn get_user<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    Path(public_id): Path<String>,
) -> ApiResult<Json<UserEnvelope>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let user = state
        .profiles
        .get_by_public_id(session.tenant_id, &public_id)
        .await?;
    Ok(Json(UserEnvelope { user }))
}

pub async fn delete_user<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    Path(public_id): Path<String>,
) -> ApiResult<StatusCode>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    state
        .profiles
        .delete_user(session.tenant_id, &public_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_user<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    Path(public_id): Path<String>,
) -> ApiResult<Json<UserEnvelope>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let user_id = state
        .profiles
        .resolve_public_id(session.tenant_id, &public_id)
        .await?;
    let user = state.accounts.deactivate(session.tenant_id, user_id).await?;
    Ok(Json(UserEnvelope { user }))
}
