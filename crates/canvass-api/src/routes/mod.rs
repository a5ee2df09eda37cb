//! Route table.

pub mod admin;
pub mod auth;
pub mod dropdowns;
pub mod profile;
pub mod settings;

use axum::extract::{DefaultBodyLimit, Multipart};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use canvass_catalog::settings::MAX_SETTING_FILE_BYTES;
use canvass_core::delivery::{FileStorage, Mailer};
use canvass_core::error::CanvassError;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::detect_request_language;
use crate::state::AppState;

/// Request bodies may carry the largest upload plus multipart framing.
pub const MAX_BODY_BYTES: usize = MAX_SETTING_FILE_BYTES + 64 * 1024;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// A file read from a multipart body.
pub(crate) struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Read the first part named `field`; other parts are skipped.
pub(crate) async fn read_file_field(mut multipart: Multipart, field: &str) -> ApiResult<UploadedFile> {
    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }
        let filename = part.file_name().unwrap_or(field).to_string();
        let content_type = part
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = part.bytes().await?;
        return Ok(UploadedFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError(CanvassError::validation(format!(
        "multipart field '{field}' is required"
    ))))
}

/// Build the application router.
pub fn router<M, F>(state: AppState<M, F>) -> Router
where
    M: Mailer + 'static,
    F: FileStorage + 'static,
{
    let auth_routes = Router::new()
        .route("/register", post(auth::register::<M, F>))
        .route("/activate", post(auth::activate::<M, F>))
        .route("/login", post(auth::login::<M, F>))
        .route("/forgot-password", post(auth::forgot_password::<M, F>))
        .route("/reset-password", post(auth::reset_password::<M, F>))
        .route("/change-password", post(auth::change_password::<M, F>));

    let admin_routes = Router::new()
        .route("/auth/login", post(admin::login::<M, F>))
        .route("/auth/forgot-password", post(admin::forgot_password::<M, F>))
        .route("/auth/reset-password", post(admin::reset_password::<M, F>))
        .route("/auth/change-password", post(admin::change_password::<M, F>))
        .route("/users", get(admin::list_users::<M, F>))
        .route(
            "/users/{public_id}",
            get(admin::get_user::<M, F>).delete(admin::delete_user::<M, F>),
        )
        .route(
            "/users/{public_id}/deactivate",
            post(admin::deactivate_user::<M, F>),
        );

    let auth_config = state.auth.clone();

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .route(
            "/profile",
            get(profile::get_profile::<M, F>).patch(profile::update_profile::<M, F>),
        )
        .route("/profile/photo", post(profile::upload_photo::<M, F>))
        .route("/dropdowns", get(dropdowns::list_kinds::<M, F>))
        .route(
            "/dropdowns/{kind}",
            get(dropdowns::list_options::<M, F>).post(dropdowns::create_option::<M, F>),
        )
        .route(
            "/dropdowns/{kind}/{id}",
            axum::routing::patch(dropdowns::update_option::<M, F>)
                .delete(dropdowns::delete_option::<M, F>),
        )
        .route("/settings", get(settings::list_settings::<M, F>))
        .route(
            "/settings/{key}",
            get(settings::get_setting::<M, F>)
                .put(settings::put_setting::<M, F>)
                .delete(settings::delete_setting::<M, F>),
        )
        .route("/settings/{key}/file", post(settings::attach_file::<M, F>))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            auth_config,
            detect_request_language,
        ))
        .with_state(state)
}
