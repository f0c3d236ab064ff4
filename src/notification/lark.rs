//! Sends text messages through a Lark (Feishu) custom bot hook.

use crate::core::{Notifier, Platform};
use crate::error::ProviderError;
use crate::notification::http::{base_url, build_client, json_or_status};
use crate::notification::signing::webhook_signature;
use crate::notification::{require, require_message};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info, instrument};

pub const API_URL: &str = "https://open.feishu.cn/open-apis/bot/v2/hook";

#[derive(Debug, Clone, Default)]
pub struct LarkOptions {
    /// Hook token.
    pub token: String,
    pub secret: Option<String>,
    pub api_url: Option<String>,
}

pub struct LarkClient {
    options: LarkOptions,
    timeout: Duration,
}

/// Older hooks answer with `StatusCode`, newer ones with `code`, some with both.
#[derive(Debug, Deserialize)]
struct HookResponse {
    code: Option<i64>,
    msg: Option<String>,
    #[serde(rename = "StatusCode")]
    status_code: Option<i64>,
    #[serde(rename = "StatusMessage")]
    status_message: Option<String>,
}

impl HookResponse {
    fn code(&self) -> i64 {
        self.code.or(self.status_code).unwrap_or(0)
    }

    fn message(&self) -> &str {
        self.msg
            .as_deref()
            .or(self.status_message.as_deref())
            .unwrap_or_default()
    }
}

impl LarkClient {
    pub fn new(options: LarkOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }

    fn payload(&self, message: &str) -> Value {
        let mut payload = json!({ "msg_type": "text", "content": { "text": message } });
        if let Some(secret) = self.options.secret.as_deref().filter(|s| !s.is_empty()) {
            let timestamp = Utc::now().timestamp();
            payload["timestamp"] = json!(timestamp.to_string());
            payload["sign"] = json!(webhook_signature(timestamp, secret, false));
        }
        payload
    }
}

#[async_trait]
impl Notifier for LarkClient {
    fn platform(&self) -> Platform {
        Platform::Lark
    }

    #[instrument(skip_all)]
    async fn send(&self, message: &str) -> Result<(), ProviderError> {
        require(&self.options.token, "token")?;
        require_message(message)?;

        let url = format!(
            "{}/{}",
            base_url(self.options.api_url.as_deref(), API_URL),
            self.options.token.trim()
        );
        let response = build_client(self.timeout)?
            .post(url)
            .json(&self.payload(message))
            .send()
            .await?;

        let reply: HookResponse = json_or_status(Platform::Lark, response).await?;
        if reply.code() != 0 {
            error!(code = reply.code(), msg = %reply.message(), "Lark rejected the message");
            return Err(ProviderError::Rejected(format!(
                "code {}: {}",
                reply.code(),
                reply.message()
            )));
        }

        info!("Successfully sent Lark message.");
        Ok(())
    }
}
