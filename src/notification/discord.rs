//! Posts messages to a Discord channel as a bot user.

use crate::core::{Notifier, Platform};
use crate::error::ProviderError;
use crate::notification::http::{base_url, build_client, ensure_success};
use crate::notification::{require, require_message};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{info, instrument};

pub const API_URL: &str = "https://discord.com/api/v10";

/// Discord refuses message content above this length.
const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Clone, Default)]
pub struct DiscordOptions {
    /// Bot token.
    pub token: String,
    /// Channel id.
    pub channel: String,
    pub api_url: Option<String>,
}

pub struct DiscordClient {
    options: DiscordOptions,
    timeout: Duration,
}

impl DiscordClient {
    pub fn new(options: DiscordOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }
}

#[async_trait]
impl Notifier for DiscordClient {
    fn platform(&self) -> Platform {
        Platform::Discord
    }

    #[instrument(skip_all, fields(channel = %self.options.channel))]
    async fn send(&self, message: &str) -> Result<(), ProviderError> {
        require(&self.options.token, "token")?;
        require(&self.options.channel, "channel")?;
        require_message(message)?;

        let length = message.chars().count();
        if length > MAX_CONTENT_CHARS {
            return Err(ProviderError::invalid(
                "message",
                format!("{length} characters exceeds the {MAX_CONTENT_CHARS} limit"),
            ));
        }

        let url = format!(
            "{}/channels/{}/messages",
            base_url(self.options.api_url.as_deref(), API_URL),
            self.options.channel.trim()
        );
        let response = build_client(self.timeout)?
            .post(url)
            .header("Authorization", format!("Bot {}", self.options.token))
            .json(&json!({ "content": message }))
            .send()
            .await?;
        ensure_success(Platform::Discord, response).await?;

        info!("Successfully posted message to Discord.");
        Ok(())
    }
}
