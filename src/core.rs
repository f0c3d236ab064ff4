//! Core domain types and the adapter contract shared by every backend.
//!
//! This module defines the platform tags, the Telegram addressing modes and
//! the `Notifier` trait that each provider adapter implements. The router in
//! `crate::notify` only ever talks to adapters through these types.

use crate::error::ProviderError;
use crate::notification::telegram::fanout::FanOutReport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies the backend a message is delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Slack,
    Pushover,
    Pagerduty,
    Discord,
    Telegram,
    DingTalk,
    Email,
    /// Amazon SES, exposed under its historical `AwsEmail` tag.
    #[serde(rename = "AwsEmail")]
    Ses,
    Lark,
    /// Reserved tag. Accepted in configuration but never routed.
    Argus,
}

impl Platform {
    /// Every known tag, routed or not.
    pub const ALL: [Platform; 10] = [
        Platform::Slack,
        Platform::Pushover,
        Platform::Pagerduty,
        Platform::Discord,
        Platform::Telegram,
        Platform::DingTalk,
        Platform::Email,
        Platform::Ses,
        Platform::Lark,
        Platform::Argus,
    ];

    /// The wire/config spelling of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Slack => "Slack",
            Platform::Pushover => "Pushover",
            Platform::Pagerduty => "Pagerduty",
            Platform::Discord => "Discord",
            Platform::Telegram => "Telegram",
            Platform::DingTalk => "DingTalk",
            Platform::Email => "Email",
            Platform::Ses => "AwsEmail",
            Platform::Lark => "Lark",
            Platform::Argus => "Argus",
        }
    }

    /// Returns `true` if the router has an adapter for this tag.
    pub fn is_routed(&self) -> bool {
        !matches!(self, Platform::Argus)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notify platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// How a Telegram destination is addressed.
///
/// `Bot` switches delivery to the multi-recipient fan-out path; every other
/// mode goes through destination resolution and a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelType {
    #[default]
    Group,
    Channel,
    User,
    Bot,
}

/// The single capability every backend adapter exposes.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The platform this adapter delivers through.
    fn platform(&self) -> Platform;

    /// Delivers one text message.
    ///
    /// # Returns
    /// * `Ok(())` once the provider accepted the message
    /// * `Err` for local validation failures (no request is made), transport
    ///   errors, or a rejection reported by the provider
    async fn send(&self, message: &str) -> Result<(), ProviderError>;
}

/// What a successful `Notify::send` call did.
#[derive(Debug)]
pub struct DeliveryReport {
    /// The platform the message was routed to.
    pub platform: Platform,
    /// Per-recipient outcomes, present only for fan-out deliveries.
    pub fan_out: Option<FanOutReport>,
}

impl DeliveryReport {
    pub(crate) fn single(platform: Platform) -> Self {
        Self {
            platform,
            fan_out: None,
        }
    }
}
