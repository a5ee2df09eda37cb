//! Dropdown taxonomies: public localized listings and admin management.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use canvass_catalog::{CreateOptionInput, LocalizedOption, UpdateOptionInput};
use canvass_core::delivery::{FileStorage, Mailer};
use canvass_core::error::CanvassError;
use canvass_core::models::dropdown::DropdownOption;
use canvass_core::taxonomy::TaxonomyKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery, AuthAdmin, PathId, TenantId, ValidTaxonomyKey};
use crate::middleware::RequestLanguage;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct KindsResponse {
    pub kinds: Vec<TaxonomyKey>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub kind: TaxonomyKey,
    pub language: String,
    pub options: Vec<LocalizedOption>,
}

/// Full option as seen by administrators, all labels included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionView {
    pub id: Uuid,
    pub kind: TaxonomyKey,
    pub value: String,
    pub labels: BTreeMap<String, String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DropdownOption> for OptionView {
    fn from(option: DropdownOption) -> Self {
        Self {
            id: option.id,
            kind: option.kind,
            value: option.value,
            labels: option.labels,
            sort_order: option.sort_order,
            active: option.active,
            created_at: option.created_at,
            updated_at: option.updated_at,
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptionRequest {
    pub value: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptionRequest {
    pub labels: Option<BTreeMap<String, String>>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

pub async fn list_kinds<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
) -> ApiResult<Json<KindsResponse>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let kinds = state.dropdowns.list_kinds(tenant_id).await?;
    Ok(Json(KindsResponse { kinds }))
}

/// Inactive options are only listed for an administrator of the same
/// tenant.
pub async fn list_options<M, F>(
    State(state): State<AppState<M, F>>,
    TenantId(tenant_id): TenantId,
    ValidTaxonomyKey(kind): ValidTaxonomyKey,
    RequestLanguage(chain): RequestLanguage,
    admin: Option<AuthAdmin>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<OptionsResponse>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    if query.include_inactive {
        match admin {
            None => return Err(ApiError(CanvassError::Unauthorized)),
            Some(admin) if admin.tenant_id != tenant_id => {
                return Err(ApiError(CanvassError::Forbidden {
                    reason: "admin belongs to another tenant".into(),
                }));
            }
            Some(_) => {}
        }
    }

    let options = state
        .dropdowns
        .list_localized(tenant_id, &kind, &chain, query.include_inactive)
        .await?;
    Ok(Json(OptionsResponse {
        kind,
        language: chain.primary().to_string(),
        options,
    }))
}

pub async fn create_option<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    ValidTaxonomyKey(kind): ValidTaxonomyKey,
    ApiJson(body): ApiJson<CreateOptionRequest>,
) -> ApiResult<(StatusCode, Json<OptionView>)>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let option = state
        .dropdowns
        .create_option(CreateOptionInput {
            tenant_id: session.tenant_id,
            kind,
            value: body.value,
            labels: body.labels,
            sort_order: body.sort_order,
            active: body.active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(option.into())))
}

pub async fn update_option<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    ValidTaxonomyKey(kind): ValidTaxonomyKey,
    PathId(id): PathId,
    ApiJson(body): ApiJson<UpdateOptionRequest>,
) -> ApiResult<Json<OptionView>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let option = state
        .dropdowns
        .update_option(
            session.tenant_id,
            &kind,
            id,
            UpdateOptionInput {
                labels: body.labels,
                sort_order: body.sort_order,
                active: body.active,
            },
        )
        .await?;
    Ok(Json(option.into()))
}

pub async fn delete_option<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthAdmin,
    ValidTaxonomyKey(kind): ValidTaxonomyKey,
    PathId(id): PathId,
) -> ApiResult<StatusCode>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    state
        .dropdowns
        .delete_option(session.tenant_id, &kind, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
