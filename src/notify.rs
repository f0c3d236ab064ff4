//! The dispatch facade.
//!
//! `Notify` owns the configuration and routes every `send` to the adapter
//! selected by the configured platform. It performs one provider call per
//! invocation, or one fan-out batch for Telegram bot accounts, and never
//! retries.

use crate::config::{Config, PlatformConfig, TelegramConfig};
use crate::core::{ChannelType, DeliveryReport, Notifier, Platform};
use crate::error::{NotifyError, ProviderError, Result};
use crate::extension::ExtensionMetadata;
use crate::notification::dingtalk::{DingTalkClient, DingTalkOptions};
use crate::notification::discord::{DiscordClient, DiscordOptions};
use crate::notification::email::{EmailClient, EmailOptions};
use crate::notification::lark::{LarkClient, LarkOptions};
use crate::notification::pagerduty::{PagerdutyClient, PagerdutyOptions};
use crate::notification::pushover::{PushoverClient, PushoverOptions};
use crate::notification::ses::{SesClient, SesOptions};
use crate::notification::slack::{SlackClient, SlackOptions};
use crate::notification::telegram::menu::{trade_menu, DEFAULT_MENU_BOT};
use crate::notification::telegram::{
    destination, fanout, send_to_destination, BotClient, TelegramBot,
};
use crate::notification::{require, require_message};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Sends messages through the backend named by its configuration.
#[derive(Debug, Clone)]
pub struct Notify {
    config: Arc<Config>,
}

impl Notify {
    pub fn new(config: impl Into<Arc<Config>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The configured platform, if any.
    pub fn platform(&self) -> Option<Platform> {
        self.config.platform.as_ref().map(PlatformConfig::platform)
    }

    /// Delivers `message` through the configured platform.
    ///
    /// `extension` is only consulted on the Telegram bot path, where it may
    /// attach a trade menu. Local validation failures are reported before
    /// any network call.
    #[instrument(skip_all, fields(platform = ?self.platform()))]
    pub async fn send(
        &self,
        message: &str,
        extension: Option<&ExtensionMetadata>,
    ) -> Result<DeliveryReport> {
        let Some(platform_config) = self.config.platform.as_ref() else {
            error!("No notify platform configured");
            return Err(NotifyError::UnsupportedPlatform("<unset>".to_string()));
        };
        let platform = platform_config.platform();
        let timeout = self.config.request_timeout();

        let outcome = match platform_config {
            PlatformConfig::Argus => {
                error!(%platform, "Platform has no delivery adapter");
                return Err(NotifyError::UnsupportedPlatform(platform.to_string()));
            }
            PlatformConfig::Telegram(telegram) => {
                send_telegram(telegram, message, extension, timeout).await
            }
            other => match adapter(other, timeout) {
                Some(notifier) => notifier
                    .send(message)
                    .await
                    .map(|()| DeliveryReport::single(platform)),
                None => return Err(NotifyError::UnsupportedPlatform(platform.to_string())),
            },
        };

        metrics::counter!("notify_send_total", "platform" => platform.as_str()).increment(1);
        match outcome {
            Ok(report) => {
                info!(%platform, "Notification delivered");
                Ok(report)
            }
            Err(e) => {
                metrics::counter!("notify_send_failures_total", "platform" => platform.as_str())
                    .increment(1);
                error!(%platform, error = %e, "Notification failed");
                Err(NotifyError::from_provider(platform, e))
            }
        }
    }
}

/// Builds the single-recipient adapter for a platform, handing it only the
/// fields it uses. Telegram and reserved tags have no such adapter.
fn adapter(config: &PlatformConfig, timeout: Duration) -> Option<Box<dyn Notifier>> {
    let notifier: Box<dyn Notifier> = match config {
        PlatformConfig::Slack(c) => Box::new(SlackClient::new(
            SlackOptions {
                token: c.token.clone(),
                channel: c.channel.clone(),
                api_url: c.api_url.clone(),
            },
            timeout,
        )),
        PlatformConfig::Pushover(c) => Box::new(PushoverClient::new(
            PushoverOptions {
                token: c.token.clone(),
                user: c.user.clone(),
                priority: c.priority,
                retry: c.retry_interval,
                expire: c.retry_expire,
                api_url: c.api_url.clone(),
            },
            timeout,
        )),
        PlatformConfig::Pagerduty(c) => Box::new(PagerdutyClient::new(
            PagerdutyOptions {
                token: c.token.clone(),
                source: c.source.clone(),
                severity: c.severity.clone(),
                api_url: c.api_url.clone(),
            },
            timeout,
        )),
        PlatformConfig::Discord(c) => Box::new(DiscordClient::new(
            DiscordOptions {
                token: c.token.clone(),
                channel: c.channel.clone(),
                api_url: c.api_url.clone(),
            },
            timeout,
        )),
        PlatformConfig::DingTalk(c) => Box::new(DingTalkClient::new(
            DingTalkOptions {
                webhook_url: c.webhook_url.clone(),
                secret: c.secret.clone(),
            },
            timeout,
        )),
        PlatformConfig::Email(c) => Box::new(EmailClient::new(
            EmailOptions {
                to: c.to.clone(),
                host: c.host.clone(),
                user: c.user.clone(),
                password: c.password.clone(),
                subject: c.subject.clone(),
            },
            timeout,
        )),
        PlatformConfig::Ses(c) => Box::new(SesClient::new(
            SesOptions {
                to: c.to.clone(),
                key: c.key.clone(),
                secret: c.secret.clone(),
                region: c.region.clone(),
                sender: c.sender.clone(),
                subject: c.subject.clone(),
                api_url: c.api_url.clone(),
            },
            timeout,
        )),
        PlatformConfig::Lark(c) => Box::new(LarkClient::new(
            LarkOptions {
                token: c.token.clone(),
                secret: c.secret.clone(),
                api_url: c.api_url.clone(),
            },
            timeout,
        )),
        PlatformConfig::Telegram(_) | PlatformConfig::Argus => return None,
    };
    Some(notifier)
}

/// Telegram delivery: a single resolved destination, or a fan-out for bot
/// accounts. The token is checked with `getMe` only after local validation.
async fn send_telegram(
    config: &TelegramConfig,
    message: &str,
    extension: Option<&ExtensionMetadata>,
    timeout: Duration,
) -> std::result::Result<DeliveryReport, ProviderError> {
    require(&config.token, "token")?;
    require_message(message)?;
    let api_url = config.api_url.as_deref();

    if config.channel_type == ChannelType::Bot {
        if config.chat_ids.is_empty() {
            return Err(ProviderError::Missing("chat ids"));
        }
        let bot: Arc<dyn BotClient> =
            Arc::new(TelegramBot::connect(&config.token, api_url, timeout).await?);

        let menu_bot = if config.menu_bot.trim().is_empty() {
            DEFAULT_MENU_BOT
        } else {
            config.menu_bot.as_str()
        };
        let menu = trade_menu(extension, menu_bot);
        debug!(menu = menu.is_some(), "Fanning out Telegram bot message");

        let report = fanout::fan_out(bot, message, &config.chat_ids, menu).await?;
        return Ok(DeliveryReport {
            platform: Platform::Telegram,
            fan_out: Some(report),
        });
    }

    let destination = destination::resolve(
        &config.channel,
        config.topic_id.as_deref(),
        config.chat_id.as_deref(),
    )?;
    if destination.target().is_none() {
        return Err(ProviderError::Missing("channel"));
    }
    debug!(%destination, channel_type = ?config.channel_type, "Resolved Telegram destination");

    let bot = TelegramBot::connect(&config.token, api_url, timeout).await?;
    send_to_destination(&bot, &destination, message).await?;
    Ok(DeliveryReport::single(Platform::Telegram))
}
