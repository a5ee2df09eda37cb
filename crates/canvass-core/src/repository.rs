//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter to enforce data isolation. Each
//! `update*` call is a single-record write, which is what makes token
//! consumption atomic with the state change it authorizes.

use uuid::Uuid;

use crate::error::CanvassResult;
use crate::models::{
    admin::{Admin, CreateAdmin, UpdateAdmin},
    dropdown::{CreateDropdownOption, DropdownOption, UpdateDropdownOption},
    setting::{Setting, UpsertSetting},
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, UpdateUser, User},
};
use crate::taxonomy::TaxonomyKey;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenant (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = CanvassResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CanvassResult<Tenant>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = CanvassResult<Tenant>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CanvassResult<User>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    fn get_by_public_id(
        &self,
        tenant_id: Uuid,
        public_id: &str,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    fn get_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    fn get_by_activation_token_hash(
        &self,
        tenant_id: Uuid,
        token_hash: &str,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    fn get_by_reset_token_hash(
        &self,
        tenant_id: Uuid,
        token_hash: &str,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    /// Replace the password hash and clear any pending reset token in
    /// one write.
    fn update_password(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        password_hash: String,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    /// `Pending → Active`, only while `activation_token_hash` still
    /// equals `token_hash`. The token is cleared in the same write.
    /// `NotFound` when the token was already consumed.
    fn activate(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        token_hash: &str,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    /// Like [`update_password`](Self::update_password), but only while
    /// `reset_token_hash` still equals `token_hash`. `NotFound` when the
    /// token was already consumed.
    fn redeem_reset_token(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        token_hash: &str,
        password_hash: String,
    ) -> impl Future<Output = CanvassResult<User>> + Send;
    /// Hard delete.
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CanvassResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CanvassResult<PaginatedResult<User>>> + Send;
}

pub trait AdminRepository: Send + Sync {
    fn create(&self, input: CreateAdmin) -> impl Future<Output = CanvassResult<Admin>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CanvassResult<Admin>> + Send;
    fn get_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> impl Future<Output = CanvassResult<Admin>> + Send;
    fn get_by_reset_token_hash(
        &self,
        tenant_id: Uuid,
        token_hash: &str,
    ) -> impl Future<Output = CanvassResult<Admin>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateAdmin,
    ) -> impl Future<Output = CanvassResult<Admin>> + Send;
    /// Replace the password hash and clear any pending reset token in
    /// one write.
    fn update_password(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        password_hash: String,
    ) -> impl Future<Output = CanvassResult<Admin>> + Send;
    /// Conditional password reset; see
    /// [`UserRepository::redeem_reset_token`].
    fn redeem_reset_token(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        token_hash: &str,
        password_hash: String,
    ) -> impl Future<Output = CanvassResult<Admin>> + Send;
}

pub trait DropdownRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDropdownOption,
    ) -> impl Future<Output = CanvassResult<DropdownOption>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CanvassResult<DropdownOption>> + Send;
    fn get_by_value(
        &self,
        tenant_id: Uuid,
        kind: &TaxonomyKey,
        value: &str,
    ) -> impl Future<Output = CanvassResult<DropdownOption>> + Send;
    /// Options of one taxonomy ordered by `sort_order`, then `value`.
    fn list_by_kind(
        &self,
        tenant_id: Uuid,
        kind: &TaxonomyKey,
        include_inactive: bool,
    ) -> impl Future<Output = CanvassResult<Vec<DropdownOption>>> + Send;
    /// Distinct taxonomy keys that have at least one option.
    fn list_kinds(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = CanvassResult<Vec<TaxonomyKey>>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDropdownOption,
    ) -> impl Future<Output = CanvassResult<DropdownOption>> + Send;
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CanvassResult<()>> + Send;
}

pub trait SettingRepository: Send + Sync {
    fn get(
        &self,
        tenant_id: Uuid,
        key: &TaxonomyKey,
    ) -> impl Future<Output = CanvassResult<Setting>> + Send;
    fn list(&self, tenant_id: Uuid) -> impl Future<Output = CanvassResult<Vec<Setting>>> + Send;
    /// Insert or replace the setting stored under `input.key`.
    fn upsert(&self, input: UpsertSetting) -> impl Future<Output = CanvassResult<Setting>> + Send;
    fn delete(
        &self,
        tenant_id: Uuid,
        key: &TaxonomyKey,
    ) -> impl Future<Output = CanvassResult<()>> + Send;
}
