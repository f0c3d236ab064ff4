//! notify-hub - a single dispatch facade over many notification providers
//!
//! A `Notify` is built from a `Config` naming one platform and that
//! platform's settings. Each `send` is routed to the matching adapter:
//! Slack, Pushover, PagerDuty, Discord, Telegram, DingTalk, SMTP email,
//! Amazon SES or Lark. Telegram bot accounts fan a message out to many chats
//! and may attach an inline trade menu derived from extension metadata.
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod extension;
pub mod notification;
pub mod notify;

// Re-export core types for convenience
pub use crate::config::{Config, PlatformConfig};
pub use crate::core::{ChannelType, DeliveryReport, Notifier, Platform};
pub use crate::error::{NotifyError, ProviderError};
pub use crate::extension::ExtensionMetadata;
pub use crate::notification::telegram::{FanOutReport, RecipientOutcome};
pub use crate::notify::Notify;
