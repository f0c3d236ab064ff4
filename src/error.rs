//! Error types for the dispatcher and its adapters.
//!
//! Adapters fail with `ProviderError`. The router wraps that into
//! `NotifyError`, splitting local validation failures (nothing was sent)
//! from failures reported by, or on the way to, the provider.

use crate::core::Platform;
use reqwest::StatusCode;
use thiserror::Error;

/// Failure raised by a single backend adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Telegram Bot API request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("provider rejected the message: {0}")]
    Rejected(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("delivery task failed: {0}")]
    Task(String),
}

impl ProviderError {
    /// Returns `true` if the error was raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, ProviderError::Missing(_) | ProviderError::Invalid { .. })
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure returned by `Notify::send`.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("not supported notify platform: {0}")]
    UnsupportedPlatform(String),

    #[error("invalid {platform} notification: {source}")]
    Validation {
        platform: Platform,
        #[source]
        source: ProviderError,
    },

    #[error("{platform} delivery failed: {source}")]
    Provider {
        platform: Platform,
        #[source]
        source: ProviderError,
    },
}

impl NotifyError {
    pub(crate) fn from_provider(platform: Platform, source: ProviderError) -> Self {
        if source.is_validation() {
            NotifyError::Validation { platform, source }
        } else {
            NotifyError::Provider { platform, source }
        }
    }

    /// The platform involved, if the error got as far as selecting one.
    pub fn platform(&self) -> Option<Platform> {
        match self {
            NotifyError::UnsupportedPlatform(_) => None,
            NotifyError::Validation { platform, .. } | NotifyError::Provider { platform, .. } => {
                Some(*platform)
            }
        }
    }
}

pub type Result<T, E = NotifyError> = std::result::Result<T, E>;
