//! Session JWT issuance/verification and one-time credential tokens
//! (account activation, password reset).

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

// ---------------------------------------------------------------------------
// Session tokens
// ---------------------------------------------------------------------------

/// Which account table the session subject lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    User,
    Admin,
}

/// JWT claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: account ID (UUID string).
    pub sub: String,
    /// Tenant ID (UUID string).
    pub tenant_id: String,
    pub role: SessionRole,
    /// Preferred language of the subject, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

impl SessionClaims {
    pub fn subject_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::SessionInvalid(format!("sub: {e}")))
    }

    pub fn tenant(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.tenant_id)
            .map_err(|e| AuthError::SessionInvalid(format!("tenant_id: {e}")))
    }
}

/// Claims bound to the subject besides the registered ones.
#[derive(Debug, Clone)]
pub struct SessionExtras {
    pub tenant_id: Uuid,
    pub role: SessionRole,
    pub lang: Option<String>,
}

/// Issue a signed EdDSA (Ed25519) session JWT.
pub fn issue_session_token(
    subject: Uuid,
    extras: SessionExtras,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: subject.to_string(),
        tenant_id: extras.tenant_id.to_string(),
        role: extras.role,
        lang: extras.lang,
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + config.session_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };
    encode_claims(&claims, config)
}

fn encode_claims(claims: &SessionClaims, config: &AuthConfig) -> Result<String, AuthError> {
    let key = EncodingKey::from_ed_pem(config.jwt_private_key_pem.as_bytes())
        .map_err(|e| AuthError::Crypto(format!("bad private key: {e}")))?;

    let header = Header::new(Algorithm::EdDSA);
    jsonwebtoken::encode(&header, claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify a session JWT (signature, expiry, issuer).
///
/// Purely stateless: no database lookup is performed.
pub fn decode_session_token(
    token: &str,
    config: &AuthConfig,
) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_ed_pem(config.jwt_public_key_pem.as_bytes())
        .map_err(|e| AuthError::Crypto(format!("bad public key: {e}")))?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::SessionExpired,
            _ => AuthError::SessionInvalid(e.to_string()),
        })
}

// ---------------------------------------------------------------------------
// One-time credential tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Activation,
    PasswordReset,
}

impl TokenPurpose {
    /// Reset tokens are expiry-checked. Activation tokens carry an
    /// expiry but are only checked for existence.
    pub fn checks_expiry(self) -> bool {
        matches!(self, TokenPurpose::PasswordReset)
    }

    fn lifetime(self, config: &AuthConfig) -> Duration {
        let secs = match self {
            TokenPurpose::Activation => config.activation_token_lifetime_secs,
            TokenPurpose::PasswordReset => config.reset_token_lifetime_secs,
        };
        Duration::seconds(secs as i64)
    }
}

/// A freshly issued credential token.
///
/// `raw` goes to the user (email link) and is then dropped; only
/// `hash` and `expires_at` are persisted.
#[derive(Clone)]
pub struct IssuedToken {
    pub raw: String,
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("raw", &"<redacted>")
            .field("hash", &self.hash)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Generate a credential token: 32 random bytes, base64url-encoded
/// (no padding), with its SHA-256 hash and expiry.
pub fn issue_token(purpose: TokenPurpose, config: &AuthConfig, now: DateTime<Utc>) -> IssuedToken {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    let raw = URL_SAFE_NO_PAD.encode(bytes);
    let hash = hash_token(&raw);
    IssuedToken {
        raw,
        hash,
        expires_at: now + purpose.lifetime(config),
    }
}

/// SHA-256 hash of a raw credential token, hex-encoded.
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a presented raw token against the stored hash.
///
/// Fails closed: a missing hash, a mismatch, or (for reset tokens) a
/// missing or elapsed expiry all return `false` with no further detail.
pub fn verify_token(
    raw: &str,
    stored_hash: Option<&str>,
    purpose: TokenPurpose,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let Some(stored_hash) = stored_hash else {
        return false;
    };
    let presented = hash_token(raw);
    let matches: bool = presented.as_bytes().ct_eq(stored_hash.as_bytes()).into();
    if !matches {
        return false;
    }
    if purpose.checks_expiry() {
        return expires_at.is_some_and(|expiry| now < expiry);
    }
    true
}
