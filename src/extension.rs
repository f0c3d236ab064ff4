//! Call-scoped extension metadata carried alongside a single send.
//!
//! Nothing in here is allowed to fail a send: unparseable input is logged
//! and treated as absent.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use tracing::warn;

/// Optional structured data attached to one `Notify::send` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    #[serde(default)]
    pub intent: Option<TxIntent>,
}

impl ExtensionMetadata {
    /// Parses metadata from JSON, returning `None` on malformed input.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed extension metadata");
                None
            }
        }
    }

    /// The swap intents carried by the metadata, if any.
    pub fn swap_intents(&self) -> &[SwapIntent] {
        self.intent
            .as_ref()
            .map(|intent| intent.swap_intents.as_slice())
            .unwrap_or_default()
    }
}

/// A transaction intent, of which only swaps are used here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxIntent {
    #[serde(default, alias = "swapIntents")]
    pub swap_intents: Vec<SwapIntent>,
}

/// One token swap. Exactly one side is expected to be the zero address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapIntent {
    #[serde(default, alias = "buyToken")]
    pub buy_token: String,
    #[serde(default, alias = "sellToken")]
    pub sell_token: String,
}

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0; 20]);

    /// Parses a hex address leniently: the `0x` prefix is optional, an odd
    /// digit count is left-padded, and only the trailing 20 bytes are kept.
    /// Returns `None` if the input contains non-hex characters.
    pub fn parse(input: &str) -> Option<Self> {
        let digits = input.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);

        let padded;
        let digits = if digits.len() % 2 == 1 {
            padded = format!("0{digits}");
            padded.as_str()
        } else {
            digits
        };

        let bytes = hex::decode(digits).ok()?;
        let mut address = [0u8; 20];
        let take = bytes.len().min(20);
        address[20 - take..].copy_from_slice(&bytes[bytes.len() - take..]);
        Some(Address(address))
    }

    pub fn is_zero(&self) -> bool {
        *self == Address::ZERO
    }

    /// Mixed-case checksum encoding (EIP-55).
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}
