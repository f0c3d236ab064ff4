//! Configuration management for notify-hub
//!
//! The `Config` struct holds the ambient settings and exactly one
//! `PlatformConfig` variant, which carries only the fields its backend uses.
//! Configuration is layered with `figment`: built-in defaults, a
//! `notify.toml` file, `NOTIFY_`-prefixed environment variables and finally
//! command-line arguments.
//!
//! Environment keys are lowercased and split on `__`, so they use the
//! snake_case field names: `NOTIFY_PLATFORM__KIND`, `NOTIFY_PLATFORM__TOKEN`,
//! `NOTIFY_PLATFORM__CHANNEL`, `NOTIFY_PLATFORM__RETRY_INTERVAL`. The camelCase
//! aliases (`retryInterval`, `retryExpire`) only match in the TOML file.

use crate::cli::Cli;
use crate::core::{ChannelType, Platform};
use crate::notification::telegram::menu::DEFAULT_MENU_BOT;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// The configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "notify.toml";

/// The main configuration struct.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the binary.
    pub log_level: String,
    /// Timeout applied to every outbound provider request, in seconds.
    pub request_timeout_seconds: u64,
    /// The backend to deliver through. `None` means no platform was chosen.
    #[serde(default)]
    pub platform: Option<PlatformConfig>,
}

/// Backend selection plus that backend's settings, tagged by `kind`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum PlatformConfig {
    Slack(SlackConfig),
    Pushover(PushoverConfig),
    Pagerduty(PagerdutyConfig),
    Discord(DiscordConfig),
    Telegram(TelegramConfig),
    DingTalk(DingTalkConfig),
    Email(EmailConfig),
    #[serde(rename = "AwsEmail")]
    Ses(SesConfig),
    Lark(LarkConfig),
    Argus,
}

impl PlatformConfig {
    /// The platform tag this variant selects.
    pub fn platform(&self) -> Platform {
        match self {
            PlatformConfig::Slack(_) => Platform::Slack,
            PlatformConfig::Pushover(_) => Platform::Pushover,
            PlatformConfig::Pagerduty(_) => Platform::Pagerduty,
            PlatformConfig::Discord(_) => Platform::Discord,
            PlatformConfig::Telegram(_) => Platform::Telegram,
            PlatformConfig::DingTalk(_) => Platform::DingTalk,
            PlatformConfig::Email(_) => Platform::Email,
            PlatformConfig::Ses(_) => Platform::Ses,
            PlatformConfig::Lark(_) => Platform::Lark,
            PlatformConfig::Argus => Platform::Argus,
        }
    }
}

/// Slack Web API (`chat.postMessage`) settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot or user OAuth token.
    pub token: String,
    /// Channel id or name.
    pub channel: String,
    pub api_url: Option<String>,
}

/// Pushover settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PushoverConfig {
    /// Application token.
    pub token: String,
    /// User or group key.
    #[serde(alias = "channel")]
    pub user: String,
    /// Message priority, -2 to 2.
    pub priority: i32,
    /// Seconds between re-notifications for emergency priority.
    #[serde(alias = "retryInterval")]
    pub retry_interval: Option<u32>,
    /// Seconds until emergency re-notifications stop.
    #[serde(alias = "retryExpire")]
    pub retry_expire: Option<u32>,
    pub api_url: Option<String>,
}

/// PagerDuty Events API v2 settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PagerdutyConfig {
    /// Integration routing key.
    pub token: String,
    /// Affected system, shown as the event source.
    pub source: String,
    /// One of `critical`, `error`, `warning`, `info`. Defaults to `critical`.
    pub severity: String,
    pub api_url: Option<String>,
}

/// Discord bot settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token.
    pub token: String,
    /// Target channel id.
    #[serde(deserialize_with = "deserialize_required_identifier")]
    pub channel: String,
    pub api_url: Option<String>,
}

/// Telegram Bot API settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token.
    pub token: String,
    /// Numeric chat id or `@handle`. Ignored for `Bot` addressing.
    #[serde(deserialize_with = "deserialize_required_identifier")]
    pub channel: String,
    /// Addressing mode.
    pub channel_type: ChannelType,
    /// Forum topic (message thread) id.
    #[serde(deserialize_with = "deserialize_identifier")]
    pub topic_id: Option<String>,
    /// Pre-resolved chat id that overrides `channel` when non-zero.
    #[serde(deserialize_with = "deserialize_identifier")]
    pub chat_id: Option<String>,
    /// Recipients for `Bot` addressing.
    pub chat_ids: Vec<i64>,
    /// Bot whose mini-app hosts the trade page linked from menus.
    pub menu_bot: String,
    pub api_url: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel: String::new(),
            channel_type: ChannelType::default(),
            topic_id: None,
            chat_id: None,
            chat_ids: Vec::new(),
            menu_bot: DEFAULT_MENU_BOT.to_string(),
            api_url: None,
        }
    }
}

/// DingTalk custom robot settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct DingTalkConfig {
    /// Robot webhook URL, including its `access_token` query.
    #[serde(alias = "channel")]
    pub webhook_url: String,
    /// Signing secret; requests are unsigned when empty.
    pub secret: String,
}

/// SMTP relay settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct EmailConfig {
    /// Comma-separated recipient addresses.
    #[serde(alias = "to_email")]
    pub to: String,
    /// Relay host, optionally with `:port`.
    pub host: String,
    /// Login name, also used as the sender address.
    pub user: String,
    pub password: String,
    pub subject: Option<String>,
}

/// Amazon SES (v2 API) settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SesConfig {
    /// Comma-separated recipient addresses.
    #[serde(alias = "to_email")]
    pub to: String,
    /// Access key id.
    pub key: String,
    /// Secret access key.
    pub secret: String,
    #[serde(alias = "area")]
    pub region: String,
    /// Verified sender identity.
    pub sender: String,
    pub subject: Option<String>,
    pub api_url: Option<String>,
}

/// Lark (Feishu) custom bot settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct LarkConfig {
    /// Hook token, the last path segment of the webhook URL.
    pub token: String,
    /// Signing secret for bots with signature verification enabled.
    pub secret: Option<String>,
    pub api_url: Option<String>,
}

/// An identifier written either as an integer or a string. Environment
/// values that look numeric arrive as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Identifier {
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        match id {
            Identifier::Signed(n) => n.to_string(),
            Identifier::Unsigned(n) => n.to_string(),
            Identifier::Text(s) => s,
        }
    }
}

fn deserialize_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Identifier>::deserialize(deserializer)?.map(String::from))
}

fn deserialize_required_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Identifier::deserialize(deserializer).map(String::from)
}

impl Config {
    /// Builds a configuration for one platform with default ambient settings.
    pub fn for_platform(platform: PlatformConfig) -> Self {
        Self {
            platform: Some(platform),
            ..Default::default()
        }
    }

    /// Loads the configuration by layering defaults, the TOML file, the
    /// environment and the command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // e.g. NOTIFY_PLATFORM__TOKEN=... keeps credentials out of the file
            .merge(Env::prefixed("NOTIFY_").split("__"));
        if cli.token.is_some() && figment.find_value("platform.kind").is_err() {
            bail!(
                "--token overrides `platform.token` but no platform is configured; \
                 add a [platform] table with a `kind` or set NOTIFY_PLATFORM__KIND"
            );
        }
        let config: Config = figment.merge(cli.clone()).extract()?;
        Ok(config)
    }

    /// The per-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            request_timeout_seconds: 10,
            platform: None,
        }
    }
}
