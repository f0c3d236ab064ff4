//! Resolves a human-entered Telegram channel into a concrete destination.
//!
//! The channel is either a numeric chat id or an `@handle`. A numeric
//! `chat_id` override, when present and non-zero, wins over both; callers
//! use it to pin a handle they already resolved to an id.

use crate::error::ProviderError;
use crate::notification::telegram::client::ChatTarget;
use std::fmt;

/// The outcome of resolution. An id of `0` means "address by name".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Destination {
    pub chat_id: i64,
    /// Public handle without the `@`, empty when addressing by id.
    pub chat_name: String,
    /// Forum topic. Only honoured when addressing by id.
    pub topic_id: Option<i32>,
}

impl Destination {
    /// The chat to address, or `None` if neither id nor name is known.
    pub fn target(&self) -> Option<ChatTarget> {
        if self.chat_id != 0 {
            Some(ChatTarget::Id(self.chat_id))
        } else if !self.chat_name.is_empty() {
            Some(ChatTarget::Username(self.chat_name.clone()))
        } else {
            None
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(target) => write!(f, "{target}")?,
            None => f.write_str("<unset>")?,
        }
        if let Some(topic) = self.topic_id {
            write!(f, "#{topic}")?;
        }
        Ok(())
    }
}

/// Parses an optional numeric identifier. Blank means absent; anything
/// else that is not an `i64` is a validation error.
fn parse_id(raw: Option<&str>, field: &'static str) -> Result<i64, ProviderError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(0),
        Some(value) => value
            .parse()
            .map_err(|_| ProviderError::invalid(field, format!("{value:?} is not a numeric id"))),
    }
}

/// Resolves `channel`, `topic_id` and the `chat_id` override.
pub fn resolve(
    channel: &str,
    topic_id: Option<&str>,
    chat_id: Option<&str>,
) -> Result<Destination, ProviderError> {
    let channel = channel.trim();
    let (mut id, name) = if channel.contains('@') {
        (0, channel.trim_start_matches('@').to_string())
    } else {
        (parse_id(Some(channel), "channel")?, String::new())
    };

    let topic = parse_id(topic_id, "topic_id")?;
    let topic = i32::try_from(topic)
        .map_err(|_| ProviderError::invalid("topic_id", format!("{topic} is out of range")))?;

    let override_id = parse_id(chat_id, "chat_id")?;
    if override_id != 0 {
        id = override_id;
    }

    Ok(Destination {
        chat_id: id,
        chat_name: name,
        topic_id: (topic != 0).then_some(topic),
    })
}
