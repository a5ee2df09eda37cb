//! Process configuration from `CANVASS_*` environment variables.
//!
//! Secrets (JWT keys, pepper, database and Brevo credentials) may also
//! be mounted as files under `/run/secrets/<NAME>`; the environment
//! variable wins when both exist.

use std::fmt::Display;
use std::fs::read_to_string;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use canvass_auth::AuthConfig;
use canvass_db::DbConfig;
use canvass_delivery::{BREVO_SEND_URL, BrevoConfig};
use tracing::{info, warn};

const SECRETS_DIR: &str = "/run/secrets";

/// Tenant and administrator created at startup when missing.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub tenant_name: String,
    pub tenant_slug: String,
    pub admin_email: Option<String>,
    pub admin_name: String,
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub cors_origin: Option<String>,
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// `None` disables outbound mail; messages are only logged.
    pub brevo: Option<BrevoConfig>,
    pub bootstrap: BootstrapConfig,
}

/// Where configuration values come from.
trait Source {
    fn var(&self, key: &str) -> Option<String>;
    fn secret_file(&self, key: &str) -> Option<String>;
}

struct Environment;

impl Source for Environment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn secret_file(&self, key: &str) -> Option<String> {
        let path = format!("{SECRETS_DIR}/{key}");
        match read_to_string(&path) {
            Ok(s) => Some(s.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read secret {key} from {path}: {e}");
                None
            }
        }
    }
}

fn try_load<T: FromStr>(source: &impl Source, key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = source.var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow!("invalid {key} value '{raw}': {e}"))
}

fn optional(source: &impl Source, key: &str) -> Option<String> {
    source.var(key)
}

fn read_secret(source: &impl Source, key: &str) -> Option<String> {
    source.var(key).or_else(|| source.secret_file(key))
}

fn required_secret(source: &impl Source, key: &str) -> anyhow::Result<String> {
    read_secret(source, key)
        .with_context(|| format!("{key} must be set or mounted at {SECRETS_DIR}/{key}"))
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_source(&Environment)
    }

    fn from_source(source: &impl Source) -> anyhow::Result<Self> {
        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            jwt_private_key_pem: required_secret(source, "CANVASS_JWT_PRIVATE_KEY")?,
            jwt_public_key_pem: required_secret(source, "CANVASS_JWT_PUBLIC_KEY")?,
            jwt_issuer: try_load(source, "CANVASS_JWT_ISSUER", &defaults.jwt_issuer)?,
            session_lifetime_secs: try_load(
                source,
                "CANVASS_SESSION_LIFETIME_SECS",
                &defaults.session_lifetime_secs.to_string(),
            )?,
            pepper: read_secret(source, "CANVASS_PASSWORD_PEPPER"),
            min_password_length: try_load(
                source,
                "CANVASS_MIN_PASSWORD_LENGTH",
                &defaults.min_password_length.to_string(),
            )?,
            reset_token_lifetime_secs: try_load(
                source,
                "CANVASS_RESET_TOKEN_LIFETIME_SECS",
                &defaults.reset_token_lifetime_secs.to_string(),
            )?,
            ..defaults
        };

        let db = DbConfig {
            url: try_load(source, "CANVASS_DB_URL", "ws://127.0.0.1:8000")?,
            namespace: try_load(source, "CANVASS_DB_NAMESPACE", "canvass")?,
            database: try_load(source, "CANVASS_DB_DATABASE", "main")?,
            username: optional(source, "CANVASS_DB_USERNAME"),
            password: read_secret(source, "CANVASS_DB_PASSWORD"),
        };

        let brevo = match read_secret(source, "CANVASS_BREVO_API_KEY") {
            Some(api_key) => Some(BrevoConfig {
                api_key,
                sender_email: try_load(source, "CANVASS_MAIL_SENDER", "noreply@canvass.local")?,
                sender_name: optional(source, "CANVASS_MAIL_SENDER_NAME"),
                app_base_url: try_load(source, "CANVASS_APP_BASE_URL", "http://localhost:3000")?,
                api_url: try_load(source, "CANVASS_BREVO_API_URL", BREVO_SEND_URL)?,
            }),
            None => {
                warn!("CANVASS_BREVO_API_KEY not set, outgoing mail will only be logged");
                None
            }
        };

        let bootstrap = BootstrapConfig {
            tenant_name: try_load(source, "CANVASS_BOOTSTRAP_TENANT_NAME", "Default")?,
            tenant_slug: try_load(source, "CANVASS_BOOTSTRAP_TENANT_SLUG", "default")?,
            admin_email: optional(source, "CANVASS_BOOTSTRAP_ADMIN_EMAIL"),
            admin_name: try_load(source, "CANVASS_BOOTSTRAP_ADMIN_NAME", "Administrator")?,
            admin_password: read_secret(source, "CANVASS_BOOTSTRAP_ADMIN_PASSWORD"),
        };

        Ok(Self {
            bind_addr: try_load(source, "CANVASS_BIND_ADDR", "0.0.0.0:8080")?,
            upload_dir: try_load(source, "CANVASS_UPLOAD_DIR", "./uploads")?,
            cors_origin: optional(source, "CANVASS_CORS_ORIGIN"),
            db,
            auth,
            brevo,
            bootstrap,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct Fake {
        vars: HashMap<&'static str, &'static str>,
        files: HashMap<&'static str, &'static str>,
    }

    impl Source for Fake {
        fn var(&self, key: &str) -> Option<String> {
            self.vars.get(key).map(|v| v.to_string())
        }

        fn secret_file(&self, key: &str) -> Option<String> {
            self.files.get(key).map(|v| v.trim().to_string())
        }
    }

    fn with_keys() -> Fake {
        let mut fake = Fake::default();
        fake.vars.insert("CANVASS_JWT_PRIVATE_KEY", "private");
        fake.files.insert("CANVASS_JWT_PUBLIC_KEY", "public\n");
        fake
    }

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::from_source(&with_keys()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.db.namespace, "canvass");
        assert_eq!(config.auth.session_lifetime_secs, 86_400);
        assert_eq!(config.auth.jwt_public_key_pem, "public");
        assert!(config.brevo.is_none());
        assert_eq!(config.bootstrap.tenant_slug, "default");
    }

    #[test]
    fn keys_are_required() {
        let err = ServerConfig::from_source(&Fake::default()).unwrap_err();
        assert!(err.to_string().contains("CANVASS_JWT_PRIVATE_KEY"));
    }

    #[test]
    fn env_beats_secret_file() {
        let mut fake = with_keys();
        fake.vars.insert("CANVASS_BREVO_API_KEY", "from-env");
        fake.files.insert("CANVASS_BREVO_API_KEY", "from-file");
        let config = ServerConfig::from_source(&fake).unwrap();
        let brevo = config.brevo.unwrap();
        assert_eq!(brevo.api_key, "from-env");
        assert_eq!(brevo.api_url, BREVO_SEND_URL);
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let mut fake = with_keys();
        fake.vars.insert("CANVASS_SESSION_LIFETIME_SECS", "a day");
        let err = ServerConfig::from_source(&fake).unwrap_err();
        assert!(err.to_string().contains("CANVASS_SESSION_LIFETIME_SECS"));
    }
}
