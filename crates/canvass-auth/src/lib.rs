//! Canvass Auth — password hashing, one-time credential tokens,
//! session JWTs, and the user/admin account flows built on them.

pub mod admin;
pub mod config;
pub mod error;
pub mod password;
pub mod profile;
pub mod service;
pub mod token;

pub use admin::{AdminAuthService, AdminLoginOutput, CreateAdminInput};
pub use config::AuthConfig;
pub use error::AuthError;
pub use profile::{PhotoUpload, ProfileService, UpdateProfileInput};
pub use service::{
    AccountService, ChangePasswordInput, LoginInput, LoginOutput, RegisterInput, RegisterOutput,
    ResetPasswordInput,
};
pub use token::{SessionClaims, SessionRole};
