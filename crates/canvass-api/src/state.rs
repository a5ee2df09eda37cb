//! Shared application state.

use std::ops::Deref;
use std::sync::Arc;

use axum::extract::FromRef;
use canvass_auth::{AccountService, AdminAuthService, AuthConfig, ProfileService};
use canvass_catalog::{DropdownService, SettingsService};
use canvass_core::delivery::{FileStorage, Mailer};
use canvass_db::{
    SurrealAdminRepository, SurrealDropdownRepository, SurrealSettingRepository,
    SurrealTenantRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

/// Services wired to the SurrealDB repositories.
pub struct Services<M: Mailer, F: FileStorage> {
    pub accounts: AccountService<SurrealUserRepository<Any>, M>,
    pub admins: AdminAuthService<SurrealAdminRepository<Any>, M>,
    pub profiles: ProfileService<SurrealUserRepository<Any>, F>,
    pub dropdowns: DropdownService<SurrealDropdownRepository<Any>>,
    pub settings: SettingsService<SurrealSettingRepository<Any>, F>,
    pub tenants: SurrealTenantRepository<Any>,
    pub auth: Arc<AuthConfig>,
}

/// Cheaply clonable handle passed to every handler.
pub struct AppState<M: Mailer, F: FileStorage>(Arc<Services<M, F>>);

impl<M: Mailer + Clone, F: FileStorage + Clone> AppState<M, F> {
    pub fn new(db: Surreal<Any>, mailer: M, storage: F, auth: AuthConfig) -> Self {
        let users = SurrealUserRepository::new(db.clone());
        Self(Arc::new(Services {
            accounts: AccountService::new(users.clone(), mailer.clone(), auth.clone()),
            admins: AdminAuthService::new(
                SurrealAdminRepository::new(db.clone()),
                mailer,
                auth.clone(),
            ),
            profiles: ProfileService::new(users, storage.clone()),
            dropdowns: DropdownService::new(SurrealDropdownRepository::new(db.clone())),
            settings: SettingsService::new(SurrealSettingRepository::new(db.clone()), storage),
            tenants: SurrealTenantRepository::new(db),
            auth: Arc::new(auth),
        }))
    }
}

impl<M: Mailer, F: FileStorage> Clone for AppState<M, F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<M: Mailer, F: FileStorage> Deref for AppState<M, F> {
    type Target = Services<M, F>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<M: Mailer, F: FileStorage> FromRef<AppState<M, F>> for Arc<AuthConfig> {
    fn from_ref(state: &AppState<M, F>) -> Self {
        Arc::clone(&state.auth)
    }
}
