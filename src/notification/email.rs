//! Delivers plain-text email through an authenticated SMTP relay.

use crate::core::{Notifier, Platform};
use crate::error::ProviderError;
use crate::notification::{require, require_message, split_recipients};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{error, info, instrument};

pub const DEFAULT_SUBJECT: &str = "Notification";

/// Port for implicit TLS; every other port negotiates STARTTLS.
const SMTPS_PORT: u16 = 465;
const SUBMISSION_PORT: u16 = 587;

#[derive(Debug, Clone, Default)]
pub struct EmailOptions {
    /// Comma-separated recipients.
    pub to: String,
    /// Relay host, optionally `host:port`.
    pub host: String,
    /// Login, also used as the `From` address.
    pub user: String,
    pub password: String,
    pub subject: Option<String>,
}

pub struct EmailClient {
    options: EmailOptions,
    timeout: Duration,
}

impl EmailClient {
    pub fn new(options: EmailOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }

    /// Splits `host[:port]`, defaulting to the submission port.
    fn relay(&self) -> Result<(&str, u16), ProviderError> {
        let host = self.options.host.trim();
        match host.rsplit_once(':') {
            Some((name, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| ProviderError::invalid("host", format!("bad port in {host:?}")))?;
                Ok((name, port))
            }
            None => Ok((host, SUBMISSION_PORT)),
        }
    }

    /// Builds the MIME message after validating every address.
    fn build_message(&self, body: &str) -> Result<Message, ProviderError> {
        let from: Mailbox = self
            .options
            .user
            .trim()
            .parse()
            .map_err(|e| ProviderError::invalid("user", format!("not an email address: {e}")))?;

        let recipients = split_recipients(&self.options.to);
        if recipients.is_empty() {
            return Err(ProviderError::Missing("recipient"));
        }

        let subject = self
            .options
            .subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SUBJECT);

        let mut builder = Message::builder()
            .from(from)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in recipients {
            let to: Mailbox = recipient.parse().map_err(|e| {
                ProviderError::invalid("recipient", format!("{recipient:?}: {e}"))
            })?;
            builder = builder.to(to);
        }

        builder
            .body(body.to_string())
            .map_err(|e| ProviderError::invalid("message", e.to_string()))
    }
}

#[async_trait]
impl Notifier for EmailClient {
    fn platform(&self) -> Platform {
        Platform::Email
    }

    #[instrument(skip_all, fields(host = %self.options.host))]
    async fn send(&self, message: &str) -> Result<(), ProviderError> {
        require(&self.options.host, "host")?;
        require(&self.options.user, "user")?;
        require(&self.options.password, "password")?;
        require_message(message)?;

        let (host, port) = self.relay()?;
        let email = self.build_message(message)?;

        let builder = if port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| ProviderError::Smtp(e.to_string()))?;

        let transport = builder
            .port(port)
            .credentials(Credentials::new(
                self.options.user.trim().to_string(),
                self.options.password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build();

        transport.send(email).await.map_err(|e| {
            error!(error = %e, "SMTP relay refused the message");
            ProviderError::Smtp(e.to_string())
        })?;

        info!("Successfully sent email notification.");
        Ok(())
    }
}
