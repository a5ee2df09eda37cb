//! [`Mailer`] implementations: the Brevo transactional API, and a
//! log-only mailer for development.

use canvass_core::delivery::Mailer;
use canvass_core::error::CanvassResult;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::DeliveryError;

pub const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Clone)]
pub struct BrevoConfig {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
    /// Frontend base URL used to build activation and reset links.
    pub app_base_url: String,
    /// Send endpoint; overridable for tests and proxies.
    pub api_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    text_content: String,
}

#[derive(Debug, Clone, Copy)]
enum MailKind {
    Activation,
    PasswordReset,
}

impl MailKind {
    fn subject(self) -> &'static str {
        match self {
            MailKind::Activation => "Activate your account",
            MailKind::PasswordReset => "Reset your password",
        }
    }

    fn path(self) -> &'static str {
        match self {
            MailKind::Activation => "activate",
            MailKind::PasswordReset => "reset-password",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            MailKind::Activation => "activation",
            MailKind::PasswordReset => "password_reset",
        }
    }
}

/// Build the link a recipient follows. Tokens are URL-safe base64 and
/// need no escaping.
fn action_link(base_url: &str, kind: MailKind, raw_token: &str) -> String {
    format!(
        "{}/{}?token={}",
        base_url.trim_end_matches('/'),
        kind.path(),
        raw_token
    )
}

fn text_body(kind: MailKind, name: &str, link: &str) -> String {
    match kind {
        MailKind::Activation => format!(
            "Hello {name},\n\nConfirm your email address to activate your account:\n{link}\n"
        ),
        MailKind::PasswordReset => format!(
            "Hello {name},\n\nUse the link below to choose a new password. \
             It expires in 10 minutes.\n{link}\n\n\
             If you did not ask for a reset you can ignore this message.\n"
        ),
    }
}

/// Sends mail through the Brevo HTTP API.
#[derive(Clone)]
pub struct BrevoMailer {
    client: reqwest::Client,
    config: BrevoConfig,
}

impl BrevoMailer {
    pub fn new(config: BrevoConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn build_body(&self, kind: MailKind, email: &str, raw_token: &str, name: &str) -> SendEmailBody {
        let link = action_link(&self.config.app_base_url, kind, raw_token);
        SendEmailBody {
            sender: EmailAddress {
                email: self.config.sender_email.clone(),
                name: self.config.sender_name.clone(),
            },
            to: vec![EmailAddress {
                email: email.to_string(),
                name: Some(name.to_string()).filter(|n| !n.is_empty()),
            }],
            subject: kind.subject().to_string(),
            text_content: text_body(kind, name, &link),
        }
    }

    #[instrument(skip(self, email, raw_token, name), fields(kind = kind.as_str()))]
    async fn send(&self, kind: MailKind, email: &str, raw_token: &str, name: &str) -> Result<(), DeliveryError> {
        let body = self.build_body(kind, email, raw_token, name);

        let resp = self
            .client
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            info!("mail accepted by provider");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "mail rejected by provider");
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl Mailer for BrevoMailer {
    async fn send_activation_email(&self, email: &str, raw_token: &str, name: &str) -> CanvassResult<()> {
        Ok(self.send(MailKind::Activation, email, raw_token, name).await?)
    }

    async fn send_password_reset_email(&self, email: &str, raw_token: &str, name: &str) -> CanvassResult<()> {
        Ok(self
            .send(MailKind::PasswordReset, email, raw_token, name)
            .await?)
    }
}

/// Mailer that only records that a message would have been sent. The
/// token is never written to the log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send_activation_email(&self, email: &str, _raw_token: &str, _name: &str) -> CanvassResult<()> {
        info!(recipient = email, kind = MailKind::Activation.as_str(), "mail delivery disabled");
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str, _raw_token: &str, _name: &str) -> CanvassResult<()> {
        info!(recipient = email, kind = MailKind::PasswordReset.as_str(), "mail delivery disabled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> BrevoMailer {
        BrevoMailer::new(BrevoConfig {
            api_key: "xkeysib-test".into(),
            sender_email: "noreply@canvass.test".into(),
            sender_name: Some("Canvass".into()),
            app_base_url: "https://app.canvass.test/".into(),
            api_url: BREVO_SEND_URL.into(),
        })
    }

    #[test]
    fn links_point_at_the_frontend() {
        assert_eq!(
            action_link("https://app.test/", MailKind::Activation, "abc_-1"),
            "https://app.test/activate?token=abc_-1"
        );
        assert_eq!(
            action_link("https://app.test", MailKind::PasswordReset, "xyz"),
            "https://app.test/reset-password?token=xyz"
        );
    }

    #[test]
    fn payload_matches_brevo_shape() {
        let body = mailer().build_body(MailKind::PasswordReset, "ana@example.org", "tok", "Ana");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["sender"]["email"], "noreply@canvass.test");
        assert_eq!(json["sender"]["name"], "Canvass");
        assert_eq!(json["to"][0]["email"], "ana@example.org");
        assert_eq!(json["subject"], "Reset your password");
        let text = json["textContent"].as_str().unwrap();
        assert!(text.contains("https://app.canvass.test/reset-password?token=tok"));
    }

    #[test]
    fn empty_recipient_name_is_omitted() {
        let body = mailer().build_body(MailKind::Activation, "ana@example.org", "tok", "");
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["to"][0].get("name").is_none());
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        assert!(mailer.send_activation_email("a@b.c", "secret", "A").await.is_ok());
        assert!(mailer.send_password_reset_email("a@b.c", "secret", "A").await.is_ok());
    }
}
