//! Public account flows for end users.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use canvass_auth::{ChangePasswordInput, LoginInput, RegisterInput, ResetPasswordInput};
use canvass_core::delivery::{FileStorage, Mailer};
use canvass_core::projection::UserProfile;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthUser, TenantId};
use crate::messages;
use crate::middleware::RequestLanguage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: UserProfile,
    pub activation_email_sent: bool,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse<P> {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: P,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

/// The detected request language becomes the preferred language when
/// the body does not name one.
pub async fn register<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    RequestLanguage(chain): RequestLanguage,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let output = state
        .accounts
        .register(RegisterInput {
            tenant_id,
            email: body.email,
            password: body.password,
            password_confirmation: body.password_confirmation,
            name: body.name,
            phone: body.phone,
            language: body.language.or_else(|| Some(chain.primary().to_string())),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: output.profile,
            activation_email_sent: output.activation_email_sent,
        }),
    ))
}

pub async fn activate<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    ApiJson(body): ApiJson<TokenRequest>,
) -> ApiResult<Json<UserEnvelope>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let user = state.accounts.activate(tenant_id, &body.token).await?;
    Ok(Json(UserEnvelope { user }))
}

pub async fn login<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<SessionResponse<UserProfile>>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let output = state
        .accounts
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

/// Always answers the same way, whether or not the email is known.
pub async fn forgot_password<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    RequestLanguage(chain): RequestLanguage,
    ApiJson(body): ApiJson<EmailRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    state.accounts.forgot_password(tenant_id, &body.email).await?;
    let (message, _) = messages::localize(&chain, "auth.reset_requested");
    Ok((StatusCode::ACCEPTED, Json(MessageResponse { message })))
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
        .accounts
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
    session: AuthUser,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<StatusCode>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    state
        .accounts
        .change_password(ChangePasswordInput {
            tenant_id: session.tenant_id,
            account_id: session.user_id,
            current_password: body.current_password,
            password: body.password,
            password_confirmation: body.password_confirmation,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
