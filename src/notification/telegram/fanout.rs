//! Best-effort delivery of one message to many Telegram chats.
//!
//! One task is spawned per chat id and all of them are awaited. A failed
//! recipient is logged and recorded but never stops its siblings, and the
//! batch as a whole succeeds once every task has finished. The caller gets
//! the per-recipient outcomes and decides what a partial failure means.

use crate::error::ProviderError;
use crate::notification::require_message;
use crate::notification::telegram::client::{BotClient, ChatTarget, OutgoingMessage};
use futures::future::join_all;
use std::sync::Arc;
use teloxide::types::InlineKeyboardMarkup;
use tracing::{error, info, instrument, warn, Instrument};

/// The result of delivering to one chat.
#[derive(Debug)]
pub struct RecipientOutcome {
    pub chat_id: i64,
    pub result: Result<(), ProviderError>,
}

impl RecipientOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a fan-out, in the order the chat ids were given.
#[derive(Debug, Default)]
pub struct FanOutReport {
    outcomes: Vec<RecipientOutcome>,
}

impl FanOutReport {
    pub fn outcomes(&self) -> &[RecipientOutcome] {
        &self.outcomes
    }

    /// Number of delivery attempts, one per chat id.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecipientOutcome> {
        self.outcomes.iter().filter(|o| !o.is_delivered())
    }

    /// `true` when at least one attempt was made and none succeeded.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.delivered() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(RecipientOutcome::is_delivered)
    }
}

/// Sends `message` to every chat in `chat_ids` concurrently.
///
/// Fails only on local validation (empty message or recipient list); once
/// delivery starts the call always returns a report.
#[instrument(skip(bot, message, menu), fields(recipients = chat_ids.len(), menu = menu.is_some()))]
pub async fn fan_out(
    bot: Arc<dyn BotClient>,
    message: &str,
    chat_ids: &[i64],
    menu: Option<InlineKeyboardMarkup>,
) -> Result<FanOutReport, ProviderError> {
    require_message(message)?;
    if chat_ids.is_empty() {
        return Err(ProviderError::Missing("chat ids"));
    }

    let handles: Vec<_> = chat_ids
        .iter()
        .map(|&chat_id| {
            let bot = Arc::clone(&bot);
            let outgoing = OutgoingMessage {
                chat: ChatTarget::Id(chat_id),
                text: message.to_string(),
                topic_id: None,
                menu: menu.clone(),
            };
            tokio::spawn(async move { bot.send_message(outgoing).await }.in_current_span())
        })
        .collect();

    let results = join_all(handles).await;

    let mut outcomes = Vec::with_capacity(results.len());
    for (&chat_id, joined) in chat_ids.iter().zip(results) {
        let result = match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!(chat_id, error = %e, "Failed to send Telegram bot message");
                Err(e)
            }
            Err(e) => {
                error!(chat_id, error = %e, "Telegram delivery task did not complete");
                Err(ProviderError::Task(e.to_string()))
            }
        };
        outcomes.push(RecipientOutcome { chat_id, result });
    }

    let report = FanOutReport { outcomes };
    let failed = report.attempted() - report.delivered();
    metrics::counter!("notify_fanout_deliveries_total").increment(report.delivered() as u64);
    metrics::counter!("notify_fanout_failures_total").increment(failed as u64);

    if report.all_failed() {
        warn!(failed, "Telegram fan-out reached no recipient");
    } else {
        info!(
            delivered = report.delivered(),
            failed, "Telegram fan-out finished"
        );
    }
    Ok(report)
}
