//! Canvass Server — application entry point.

mod config;

use std::time::Duration;

use anyhow::Context;
use axum::http::header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_LANGUAGE, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use canvass_api::{AppState, router};
use canvass_auth::CreateAdminInput;
use canvass_core::delivery::Mailer;
use canvass_core::error::CanvassError;
use canvass_core::models::tenant::{CreateTenant, Tenant};
use canvass_core::repository::TenantRepository;
use canvass_db::{DbManager, SurrealTenantRepository, run_migrations};
use canvass_delivery::{BrevoMailer, LocalFileStorage, LogMailer};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{BootstrapConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("canvass=info".parse()?))
        .json()
        .init();

    info!("Starting Canvass server...");

    let config = ServerConfig::load()?;
    let db = DbManager::connect(&config.db)
        .await
        .context("failed to connect to SurrealDB")?;
    run_migrations(db.client())
        .await
        .context("failed to apply schema migrations")?;

    match config.brevo.clone() {
        Some(brevo) => serve(config, db, BrevoMailer::new(brevo)).await?,
        None => serve(config, db, LogMailer).await?,
    }

    info!("Canvass server stopped.");
    Ok(())
}

async fn serve<M>(config: ServerConfig, db: DbManager, mailer: M) -> anyhow::Result<()>
where
    M: Mailer + Clone + 'static,
{
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("cannot create {}", config.upload_dir.display()))?;

    let state = AppState::new(
        db.client().clone(),
        mailer,
        LocalFileStorage::new(config.upload_dir.clone()),
        config.auth.clone(),
    );
    bootstrap(&state, &db, &config.bootstrap).await?;

    let app = router(state)
        .layer(cors(config.cors_origin.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.bind_addr))?;
    info!("Server running on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

fn cors(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin).context("invalid CANVASS_CORS_ORIGIN")?,
        ),
        None => AllowOrigin::from(Any),
    };
    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT_LANGUAGE,
            HeaderName::from_static("x-tenant-id"),
            HeaderName::from_static("x-language"),
        ])
        .expose_headers([CONTENT_LANGUAGE])
        .max_age(Duration::from_secs(60 * 60)))
}

/// Ensure the bootstrap tenant exists and, when credentials are
/// configured, its first administrator.
async fn bootstrap<M: Mailer + 'static>(
    state: &AppState<M, LocalFileStorage>,
    db: &DbManager,
    config: &BootstrapConfig,
) -> anyhow::Result<()> {
    let tenants = SurrealTenantRepository::new(db.client().clone());
    let tenant: Tenant = match tenants.get_by_slug(&config.tenant_slug).await {
        Ok(tenant) => tenant,
        Err(CanvassError::NotFound { .. }) => {
            let tenant = tenants
                .create(CreateTenant {
                    name: config.tenant_name.clone(),
                    slug: config.tenant_slug.clone(),
                })
                .await?;
            info!(tenant_id = %tenant.id, slug = %tenant.slug, "bootstrap tenant created");
            tenant
        }
        Err(e) => return Err(e.into()),
    };
    info!(tenant_id = %tenant.id, slug = %tenant.slug, "serving bootstrap tenant");

    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        warn!("bootstrap admin credentials not configured, skipping admin creation");
        return Ok(());
    };

    match state
        .admins
        .create_admin(CreateAdminInput {
            tenant_id: tenant.id,
            email: email.clone(),
            name: config.admin_name.clone(),
            password: password.clone(),
        })
        .await
    {
        Ok(admin) => info!(admin_id = %admin.id, "bootstrap admin created"),
        Err(CanvassError::Conflict { .. }) => info!("bootstrap admin already exists"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
