//! A client for posting messages through the Slack Web API.

use crate::core::{Notifier, Platform};
use crate::error::ProviderError;
use crate::notification::http::{base_url, build_client, json_or_status};
use crate::notification::{require, require_message};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, instrument};

pub const API_URL: &str = "https://slack.com/api";

/// Options for a single `chat.postMessage` call.
#[derive(Debug, Clone, Default)]
pub struct SlackOptions {
    pub token: String,
    pub channel: String,
    pub api_url: Option<String>,
}

/// Posts messages to one Slack channel.
pub struct SlackClient {
    options: SlackOptions,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    /// Creates a new `SlackClient`.
    pub fn new(options: SlackOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }
}

#[async_trait]
impl Notifier for SlackClient {
    fn platform(&self) -> Platform {
        Platform::Slack
    }

    #[instrument(skip_all, fields(channel = %self.options.channel))]
    async fn send(&self, message: &str) -> Result<(), ProviderError> {
        require(&self.options.token, "token")?;
        require(&self.options.channel, "channel")?;
        require_message(message)?;

        let url = format!(
            "{}/chat.postMessage",
            base_url(self.options.api_url.as_deref(), API_URL)
        );
        let payload = json!({ "channel": self.options.channel, "text": message });

        let response = build_client(self.timeout)?
            .post(url)
            .bearer_auth(&self.options.token)
            .json(&payload)
            .send()
            .await?;

        let reply: PostMessageResponse = json_or_status(Platform::Slack, response).await?;
        if !reply.ok {
            let reason = reply.error.unwrap_or_else(|| "unknown error".to_string());
            error!(error = %reason, "Slack rejected the message");
            return Err(ProviderError::Rejected(reason));
        }

        info!("Successfully posted message to Slack.");
        Ok(())
    }
}
