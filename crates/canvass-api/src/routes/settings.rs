//! Tenant settings: public reads, admin writes.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use canvass_catalog::{FileUpload, SettingView};
use canvass_core::delivery::{FileStorage, Mailer};
use serde::{Deserialize, Serialize};

use super::read_file_field;
use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthAdmin, TenantId, ValidTaxonomyKey};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: Vec<SettingView>,
}

#[derive(Debug, Deserialize)]
pub struct PutSettingRequest {
    pub value: serde_json::Value,
}

pub async fn list_settings<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
) -> ApiResult<Json<SettingsResponse>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let settings = state.settings.list(tenant_id).await?;
    Ok(Json(SettingsResponse { settings }))
}

pub async fn get_setting<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    ValidTaxonomyKey(key): ValidTaxonomyKey,
) -> ApiResult<Json<SettingView>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    Ok(Json(state.settings.get(tenant_id, &key).await?))
}

pub async fn put_setting<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    ValidTaxonomyKey(key): ValidTaxonomyKey,
    ApiJson(body): ApiJson<PutSettingRequest>,
) -> ApiResult<Json<SettingView>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let view = state
        .settings
        .put_value(session.tenant_id, key, body.value)
        .await?;
    Ok(Json(view))
}

/// Multipart upload; the content is read from the `file` field.
pub async fn attach_file<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    ValidTaxonomyKey(key): ValidTaxonomyKey,
    multipart: Multipart,
) -> ApiResult<Json<SettingView>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let file = read_file_field(multipart, "file").await?;
    let view = state
        .settings
        .attach_file(
            session.tenant_id,
            key,
            FileUpload {
                filename: file.filename,
                bytes: file.bytes,
            },
        )
        .await?;
    Ok(Json(view))
}

pub async fn delete_setting<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    ValidTaxonomyKey(key): ValidTaxonomyKey,
) -> ApiResult<StatusCode>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    state.settings.delete(session.tenant_id, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}
