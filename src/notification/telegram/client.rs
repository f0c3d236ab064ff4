//! The Telegram bot used for delivery, built on `teloxide`.

use crate::error::ProviderError;
use crate::notification::require;
use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use teloxide::{
    payloads::SendMessageSetters,
    prelude::*,
    types::{InlineKeyboardMarkup, MessageId, Recipient, ThreadId},
    RequestError,
};
use tracing::{debug, error, info, instrument};

/// Where a message goes: a numeric chat id or a public `@username`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    Id(i64),
    /// Stored without the leading `@`.
    Username(String),
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTarget::Id(id) => write!(f, "{id}"),
            ChatTarget::Username(name) => write!(f, "@{name}"),
        }
    }
}

impl From<ChatTarget> for Recipient {
    fn from(target: ChatTarget) -> Self {
        match target {
            ChatTarget::Id(id) => Recipient::Id(ChatId(id)),
            ChatTarget::Username(name) => Recipient::ChannelUsername(format!("@{name}")),
        }
    }
}

/// One `sendMessage` call.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub chat: ChatTarget,
    pub text: String,
    /// Forum topic, sent as `message_thread_id`.
    pub topic_id: Option<i32>,
    /// Inline keyboard, sent as `reply_markup`.
    pub menu: Option<InlineKeyboardMarkup>,
}

/// The send-only surface the dispatcher needs from a bot.
#[async_trait]
pub trait BotClient: Send + Sync {
    async fn send_message(&self, message: OutgoingMessage) -> Result<(), ProviderError>;
}

/// A bot whose token has been checked against the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    /// Validates the token with `getMe` and returns a ready bot.
    ///
    /// `api_url` replaces `https://api.telegram.org` (self-hosted Bot API
    /// servers, tests).
    #[instrument(skip_all)]
    pub async fn connect(
        token: &str,
        api_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        require(token, "token")?;

        let client = teloxide::net::default_reqwest_settings()
            .timeout(timeout)
            .build()
            .map_err(RequestError::Network)?;
        let mut bot = Bot::with_client(token.trim(), client);
        if let Some(url) = api_url.map(str::trim).filter(|url| !url.is_empty()) {
            let url = Url::parse(url)
                .map_err(|e| ProviderError::invalid("api_url", format!("{url:?}: {e}")))?;
            bot = bot.set_api_url(url);
        }

        let me = bot.get_me().await.map_err(|e| {
            error!(error = %e, "Failed to initialise Telegram bot");
            ProviderError::Telegram(e)
        })?;
        let username = me.user.username.as_deref().unwrap_or_default();
        debug!(bot = %username, "Telegram bot authenticated");
        Ok(Self { bot })
    }
}

#[async_trait]
impl BotClient for TelegramBot {
    #[instrument(skip_all, fields(chat = %message.chat))]
    async fn send_message(&self, message: OutgoingMessage) -> Result<(), ProviderError> {
        let mut request = self
            .bot
            .send_message(Recipient::from(message.chat), message.text);
        if let Some(topic) = message.topic_id {
            request = request.message_thread_id(ThreadId(MessageId(topic)));
        }
        if let Some(menu) = message.menu {
            request = request.reply_markup(menu);
        }

        request.await?;
        info!("Telegram accepted the message.");
        Ok(())
    }
}
