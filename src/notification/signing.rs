//! Request signing primitives used by DingTalk, Lark and SES.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub(crate) fn base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Robot webhook signature: `base64(HMAC(secret, "{timestamp}\n{secret}"))`.
///
/// DingTalk keys the MAC with the secret; Lark keys it with the string to
/// sign and MACs an empty message, hence `key_with_secret`.
pub(crate) fn webhook_signature(timestamp: i64, secret: &str, key_with_secret: bool) -> String {
    let string_to_sign = format!("{timestamp}\n{secret}");
    let mac = if key_with_secret {
        hmac_sha256(secret.as_bytes(), string_to_sign.as_bytes())
    } else {
        hmac_sha256(string_to_sign.as_bytes(), b"")
    };
    base64(&mac)
}
