//! Builds the inline "Buy" button attached to bot-account messages.
//!
//! A menu is produced only for extension metadata carrying exactly one swap
//! intent in which exactly one side is the zero address. Anything else,
//! including malformed addresses, yields no menu.

use crate::extension::{Address, ExtensionMetadata, SwapIntent};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Url;
use serde_json::json;
use std::fmt;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::{debug, warn};

/// Bot hosting the swap mini-app unless configured otherwise.
pub const DEFAULT_MENU_BOT: &str = "official_swapbot";

const TRADE_PATH: &str = "/trade";
const BUTTON_LABEL: &str = "Buy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deep link into a bot's mini-app: `{"p": path, "d": data}` as base64 JSON
/// in the `startapp` parameter.
pub fn link_to_page(bot_id: &str, path: &str, data: serde_json::Value) -> String {
    let payload = json!({ "p": path, "d": data }).to_string();
    format!(
        "https://t.me/{bot_id}/swap?startapp={}",
        STANDARD.encode(payload.as_bytes())
    )
}

/// Decides the side of a swap and the token being traded.
fn trade_of(intent: &SwapIntent) -> Option<(TradeSide, Address)> {
    let buy = Address::parse(&intent.buy_token)?;
    let sell = Address::parse(&intent.sell_token)?;
    match (buy.is_zero(), sell.is_zero()) {
        (true, false) => Some((TradeSide::Sell, sell)),
        (false, true) => Some((TradeSide::Buy, buy)),
        _ => None,
    }
}

/// Derives the trade menu for a message, if the metadata calls for one.
pub fn trade_menu(
    extension: Option<&ExtensionMetadata>,
    bot_id: &str,
) -> Option<InlineKeyboardMarkup> {
    let [intent] = extension?.swap_intents() else {
        return None;
    };

    let Some((side, token)) = trade_of(intent) else {
        debug!(?intent, "Swap intent has no single placeholder side, skipping menu");
        return None;
    };

    let data = json!({ "s": side.as_str(), "t": token.to_checksum() });
    let link = link_to_page(bot_id, TRADE_PATH, data);
    let url = match Url::parse(&link) {
        Ok(url) => url,
        Err(e) => {
            warn!(bot = bot_id, error = %e, "Menu bot yields an invalid link, skipping menu");
            return None;
        }
    };
    Some(InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::url(BUTTON_LABEL, url),
    ]]))
}
