//! Authentication configuration.

/// Configuration for the account and admin authentication services.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for session JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for session JWT verification.
    pub jwt_public_key_pem: String,
    /// Session token lifetime in seconds (default: 86_400 = 1 day).
    pub session_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
    /// Activation token lifetime in seconds (default: 600 = 10 minutes).
    /// Recorded on the account but not enforced at activation.
    pub activation_token_lifetime_secs: u64,
    /// Password reset token lifetime in seconds (default: 600 = 10 minutes).
    pub reset_token_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            session_lifetime_secs: 86_400,
            jwt_issuer: "canvass".into(),
            pepper: None,
            min_password_length: 8,
            activation_token_lifetime_secs: 600,
            reset_token_lifetime_secs: 600,
        }
    }
}
