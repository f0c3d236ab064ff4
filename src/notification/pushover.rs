//! A client for the Pushover message API.

use crate::core::{Notifier, Platform};
use crate::error::ProviderError;
use crate::notification::http::{base_url, build_client, json_or_status};
use crate::notification::{require, require_message};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument};

pub const API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Emergency priority, which requires `retry` and `expire`.
const EMERGENCY: i32 = 2;

/// Options for a Pushover message.
#[derive(Debug, Clone, Default)]
pub struct PushoverOptions {
    pub token: String,
    /// User or group key.
    pub user: String,
    pub priority: i32,
    /// Seconds between emergency re-notifications.
    pub retry: Option<u32>,
    /// Seconds until emergency re-notifications stop.
    pub expire: Option<u32>,
    pub api_url: Option<String>,
}

pub struct PushoverClient {
    options: PushoverOptions,
    timeout: Duration,
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    token: &'a str,
    user: &'a str,
    message: &'a str,
    priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expire: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    status: i64,
    #[serde(default)]
    errors: Vec<String>,
}

impl PushoverClient {
    pub fn new(options: PushoverOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }

    fn validate(&self, message: &str) -> Result<(), ProviderError> {
        require(&self.options.token, "token")?;
        require(&self.options.user, "user")?;
        require_message(message)?;

        if !(-2..=EMERGENCY).contains(&self.options.priority) {
            return Err(ProviderError::invalid(
                "priority",
                format!("{} is outside -2..=2", self.options.priority),
            ));
        }
        if self.options.priority == EMERGENCY {
            if self.options.retry.is_none() {
                return Err(ProviderError::Missing("retry interval"));
            }
            if self.options.expire.is_none() {
                return Err(ProviderError::Missing("retry expiry"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for PushoverClient {
    fn platform(&self) -> Platform {
        Platform::Pushover
    }

    #[instrument(skip_all, fields(priority = self.options.priority))]
    async fn send(&self, message: &str) -> Result<(), ProviderError> {
        self.validate(message)?;

        let request = MessageRequest {
            token: &self.options.token,
            user: &self.options.user,
            message,
            priority: self.options.priority,
            retry: self.options.retry,
            expire: self.options.expire,
        };

        let response = build_client(self.timeout)?
            .post(base_url(self.options.api_url.as_deref(), API_URL))
            .json(&request)
            .send()
            .await?;

        let reply: MessageResponse = json_or_status(Platform::Pushover, response).await?;
        if reply.status != 1 {
            let reason = if reply.errors.is_empty() {
                format!("status {}", reply.status)
            } else {
                reply.errors.join("; ")
            };
            error!(error = %reason, "Pushover rejected the message");
            return Err(ProviderError::Rejected(reason));
        }

        info!("Successfully sent Pushover notification.");
        Ok(())
    }
}
