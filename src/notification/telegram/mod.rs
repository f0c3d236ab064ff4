//! Telegram delivery through the Bot API.
//!
//! Two paths share one bot client:
//! - channel addressing (`Group`, `Channel`, `User`): the configured channel is
//!   resolved by `destination` and receives a single message;
//! - bot-account addressing (`Bot`): the message fans out to every configured
//!   chat id through `fanout`, optionally carrying a trade menu from `menu`.
pub mod client;
pub mod destination;
pub mod fanout;
pub mod menu;

pub use client::{BotClient, ChatTarget, OutgoingMessage, TelegramBot};
pub use destination::Destination;
pub use fanout::{FanOutReport, RecipientOutcome};
pub use menu::trade_menu;

use crate::error::ProviderError;
use crate::notification::require_message;
use tracing::{debug, info, instrument};

/// Sends one message to a resolved channel destination.
#[instrument(skip(bot, message), fields(chat = %destination))]
pub async fn send_to_destination(
    bot: &dyn BotClient,
    destination: &Destination,
    message: &str,
) -> Result<(), ProviderError> {
    require_message(message)?;
    let chat = destination.target().ok_or(ProviderError::Missing("channel"))?;

    // Topics exist only in groups addressed by id.
    let topic_id = match chat {
        ChatTarget::Id(_) => destination.topic_id,
        ChatTarget::Username(_) => {
            if let Some(topic) = destination.topic_id {
                debug!(topic, "Dropping topic for a username destination");
            }
            None
        }
    };

    bot.send_message(OutgoingMessage {
        chat,
        text: message.to_string(),
        topic_id,
        menu: None,
    })
    .await?;

    info!("Successfully sent Telegram message.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBot {
        sent: Mutex<Vec<OutgoingMessage>>,
    }

    #[async_trait]
    impl BotClient for RecordingBot {
        async fn send_message(&self, message: OutgoingMessage) -> Result<(), ProviderError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_topic_messages_carry_thread_id() {
        let bot = RecordingBot::default();
        let destination = destination::resolve("-1001234", Some("7"), None).unwrap();

        send_to_destination(&bot, &destination, "hello").await.unwrap();

        let sent = bot.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat, ChatTarget::Id(-1001234));
        assert_eq!(sent[0].topic_id, Some(7));
        assert!(sent[0].menu.is_none());
    }

    #[tokio::test]
    async fn test_handles_are_sent_by_username_without_topic() {
        let bot = RecordingBot::default();
        let destination = destination::resolve("@mychannel", Some("9"), None).unwrap();

        send_to_destination(&bot, &destination, "hello").await.unwrap();

        let sent = bot.sent.lock().unwrap();
        assert_eq!(sent[0].chat, ChatTarget::Username("mychannel".to_string()));
        assert_eq!(sent[0].topic_id, None);
    }

    #[tokio::test]
    async fn test_resolved_handle_keeps_its_topic() {
        let bot = RecordingBot::default();
        let destination = destination::resolve("@mychannel", Some("9"), Some("-100777")).unwrap();

        send_to_destination(&bot, &destination, "hello").await.unwrap();

        let sent = bot.sent.lock().unwrap();
        assert_eq!(sent[0].chat, ChatTarget::Id(-100777));
        assert_eq!(sent[0].topic_id, Some(9));
    }

    #[tokio::test]
    async fn test_unaddressed_destination_is_missing_channel() {
        let bot = RecordingBot::default();
        let destination = destination::resolve("", None, None).unwrap();

        let err = send_to_destination(&bot, &destination, "hello").await.unwrap_err();

        assert!(matches!(err, ProviderError::Missing("channel")));
        assert!(bot.sent.lock().unwrap().is_empty());
    }
}
