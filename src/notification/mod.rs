//! Backend adapters, one per provider.
//!
//! Every adapter is built from a small options record, validates it when
//! asked to send, and then performs exactly one provider call (Telegram bot
//! accounts fan out, see `telegram::fanout`). Adapters implement
//! `crate::core::Notifier`.
pub mod dingtalk;
pub mod discord;
pub mod email;
pub mod http;
pub mod lark;
pub mod pagerduty;
pub mod pushover;
pub mod ses;
pub(crate) mod signing;
pub mod slack;
pub mod telegram;

use crate::error::ProviderError;

/// Rejects empty messages before any request is made.
pub(crate) fn require_message(message: &str) -> Result<(), ProviderError> {
    if message.trim().is_empty() {
        return Err(ProviderError::Missing("message"));
    }
    Ok(())
}

/// Rejects empty required option values.
pub(crate) fn require(value: &str, what: &'static str) -> Result<(), ProviderError> {
    if value.trim().is_empty() {
        return Err(ProviderError::Missing(what));
    }
    Ok(())
}

/// Splits a comma-separated recipient list, dropping empty entries.
pub(crate) fn split_recipients(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_message_is_missing() {
        assert!(matches!(
            require_message("  \n"),
            Err(ProviderError::Missing("message"))
        ));
        assert!(require_message("disk full").is_ok());
    }

    #[test]
    fn test_split_recipients() {
        assert_eq!(
            split_recipients("a@example.com, b@example.com,,"),
            vec!["a@example.com", "b@example.com"]
        );
        assert!(split_recipients(" , ").is_empty());
    }
}
