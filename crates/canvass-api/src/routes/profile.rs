//! The signed-in user's own profile.

use axum::Json;
use axum::extract::{Multipart, State};
use canvass_auth::{PhotoUpload, UpdateProfileInput};
use canvass_core::delivery::{FileStorage, Mailer};
use serde::{Deserialize, Deserializer};

use super::auth::UserEnvelope;
use super::read_file_field;
use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthUser};
use crate::state::AppState;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub language: Option<Option<String>>,
}

pub async fn get_profile<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthUser,
) -> ApiResult<Json<UserEnvelope>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let user = state
        .profiles
        .get_profile(session.tenant_id, session.user_id)
        .await?;
    Ok(Json(UserEnvelope { user }))
}

pub async fn update_profile<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserEnvelope>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let user = state
        .profiles
        .update_profile(
            session.tenant_id,
            session.user_id,
            UpdateProfileInput {
                name: body.name,
                phone: body.phone,
                language: body.language,
            },
        )
        .await?;
    Ok(Json(UserEnvelope { user }))
}

/// Multipart upload; the image is read from the `photo` field.
pub async fn upload_photo<M, F>(
    State(state): State<AppState<M, F>>,
    session: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<UserEnvelope>>
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let file = read_file_field(multipart, "photo").await?;
    let user = state
        .profiles
        .update_photo(
            session.tenant_id,
            session.user_id,
            PhotoUpload {
                filename: file.filename,
                content_type: file.content_type,
                bytes: file.bytes,
            },
        )
        .await?;
    Ok(Json(UserEnvelope { user }))
}
