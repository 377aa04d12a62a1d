//! Email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send
//! plain-text emails for project notices. If `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and no mailer is constructed.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::notice::ProjectNotice;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "noreply@roofdesk.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default                   |
    /// |-----------------|----------|---------------------------|
    /// | `SMTP_HOST`     | yes      |                           |
    /// | `SMTP_PORT`     | no       | `587`                     |
    /// | `SMTP_FROM`     | no       | `noreply@roofdesk.local`  |
    /// | `SMTP_USER`     | no       |                           |
    /// | `SMTP_PASSWORD` | no       |                           |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. `None` without `SMTP_HOST`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let smtp_host = lookup("SMTP_HOST").filter(|h| !h.trim().is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: lookup("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: lookup("SMTP_USER"),
            smtp_password: lookup("SMTP_PASSWORD"),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends project notice emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Assemble the message for `notice` without sending it.
    pub fn compose(&self, to_email: &str, notice: &ProjectNotice) -> Result<Message, EmailError> {
        let subject = format!("[Roofdesk] {}", notice.title());
        let body = format!(
            "{}\n\nProject: {} (#{})\n",
            notice.message(),
            notice.project_name,
            notice.project_id
        );

        Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    /// Send the notice email to `to_email`.
    pub async fn deliver(&self, to_email: &str, notice: &ProjectNotice) -> Result<(), EmailError> {
        let email = self.compose(to_email, notice)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        transport_builder.build().send(email).await?;

        tracing::info!(
            to = to_email,
            event_type = %notice.event_type,
            project_id = notice.project_id,
            "Notification email sent",
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;
    use crate::notice::PROJECT_COMPLETED;

    fn config_from(vars: &[(&str, &str)]) -> Option<EmailConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EmailConfig::from_lookup(|key| map.get(key).cloned())
    }

    fn delivery() -> EmailDelivery {
        EmailDelivery::new(config_from(&[("SMTP_HOST", "smtp.roof.test")]).unwrap())
    }

    #[test]
    fn config_is_none_without_smtp_host() {
        assert!(config_from(&[]).is_none());
        assert!(config_from(&[("SMTP_HOST", "  ")]).is_none());
    }

    #[test]
    fn config_applies_defaults() {
        let config =
            config_from(&[("SMTP_HOST", "smtp.roof.test"), ("SMTP_PORT", "nope")]).unwrap();
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
        assert_eq!(config.from_address, DEFAULT_FROM_ADDRESS);
        assert!(config.smtp_user.is_none());
    }

    #[test]
    fn compose_builds_subject_from_notice() {
        let notice = ProjectNotice::new(PROJECT_COMPLETED, 9, "Oak St", 1, 2);
        let message = delivery().compose("client@roof.test", &notice).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: [Roofdesk] Project completed"));
        assert!(raw.contains("\"Oak St\" has been completed."));
    }

    #[test]
    fn compose_rejects_bad_recipient() {
        let notice = ProjectNotice::new(PROJECT_COMPLETED, 9, "Oak St", 1, 2);
        assert_matches!(
            delivery().compose("not-an-email", &notice),
            Err(EmailError::Address(_))
        );
    }

    #[test]
    fn build_error_display() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
