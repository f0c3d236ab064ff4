//! Sends email through the Amazon SES v2 `SendEmail` API.
//!
//! Requests are signed with AWS Signature Version 4 directly rather than
//! through the AWS SDK; only one operation is ever called.

use crate::core::{Notifier, Platform};
use crate::error::ProviderError;
use crate::notification::email::DEFAULT_SUBJECT;
use crate::notification::http::{build_client, ensure_success};
use crate::notification::signing::{hmac_sha256, sha256_hex};
use crate::notification::{require, require_message, split_recipients};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SERVICE: &str = "ses";
const SEND_EMAIL_PATH: &str = "/v2/email/outbound-emails";

#[derive(Debug, Clone, Default)]
pub struct SesOptions {
    /// Comma-separated recipients.
    pub to: String,
    /// Access key id.
    pub key: String,
    /// Secret access key.
    pub secret: String,
    pub region: String,
    /// Verified sender address.
    pub sender: String,
    pub subject: Option<String>,
    pub api_url: Option<String>,
}

pub struct SesClient {
    options: SesOptions,
    timeout: Duration,
}

/// The headers a signed request must carry.
#[derive(Debug)]
struct SignedHeaders {
    amz_date: String,
    authorization: String,
}

impl SesClient {
    pub fn new(options: SesOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }

    fn endpoint(&self) -> String {
        let base = match self.options.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://email.{}.amazonaws.com", self.options.region.trim()),
        };
        format!("{base}{SEND_EMAIL_PATH}")
    }

    /// Signs a JSON `POST` per SigV4 for the given instant.
    fn sign(&self, url: &Url, body: &[u8], now: DateTime<Utc>) -> SignedHeaders {
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let host = match url.port() {
            Some(port) => format!("{}:{port}", url.host_str().unwrap_or_default()),
            None => url.host_str().unwrap_or_default().to_string(),
        };
        let payload_hash = sha256_hex(body);
        let signed_headers = "content-type;host;x-amz-date";
        let canonical_headers =
            format!("content-type:application/json\nhost:{host}\nx-amz-date:{amz_date}\n");
        let canonical_request = format!(
            "POST\n{}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
            url.path()
        );

        let region = self.options.region.trim();
        let credential_scope = format!("{date_stamp}/{region}/{SERVICE}/aws4_request");
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{credential_scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let signing_key = derive_signing_key(&self.options.secret, &date_stamp, region, SERVICE);
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        SignedHeaders {
            authorization: format!(
                concat!(
                    "AWS4-HMAC-SHA256 Credential={}/{}, ",
                    "SignedHeaders={}, Signature={}"
                ),
                self.options.key.trim(),
                credential_scope,
                signed_headers,
                signature
            ),
            amz_date,
        }
    }
}

fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

#[async_trait]
impl Notifier for SesClient {
    fn platform(&self) -> Platform {
        Platform::Ses
    }

    #[instrument(skip_all, fields(region = %self.options.region))]
    async fn send(&self, message: &str) -> Result<(), ProviderError> {
        require(&self.options.key, "access key")?;
        require(&self.options.secret, "secret key")?;
        require(&self.options.region, "region")?;
        require(&self.options.sender, "sender")?;
        require_message(message)?;
        let recipients = split_recipients(&self.options.to);
        if recipients.is_empty() {
            return Err(ProviderError::Missing("recipient"));
        }

        let subject = self
            .options
            .subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SUBJECT);
        let body = json!({
            "FromEmailAddress": self.options.sender.trim(),
            "Destination": { "ToAddresses": recipients },
            "Content": {
                "Simple": {
                    "Subject": { "Data": subject, "Charset": "UTF-8" },
                    "Body": { "Text": { "Data": message, "Charset": "UTF-8" } }
                }
            }
        });
        let body = serde_json::to_vec(&body)
            .map_err(|e| ProviderError::invalid("message", e.to_string()))?;

        let url = Url::parse(&self.endpoint())
            .map_err(|e| ProviderError::invalid("region", format!("bad SES endpoint: {e}")))?;
        let signed = self.sign(&url, &body, Utc::now());
        debug!(endpoint = %url, "Sending signed SES request");

        let response = build_client(self.timeout)?
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-amz-date", &signed.amz_date)
            .header("Authorization", &signed.authorization)
            .body(body)
            .send()
            .await?;
        ensure_success(Platform::Ses, response).await?;

        info!("Successfully sent SES email.");
        Ok(())
    }
}
