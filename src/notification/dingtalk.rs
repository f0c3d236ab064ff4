//! Sends text messages through a DingTalk custom robot webhook.

use crate::core::{Notifier, Platform};
use crate::error::ProviderError;
use crate::notification::http::{build_client, json_or_status};
use crate::notification::signing::webhook_signature;
use crate::notification::{require, require_message};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, Default)]
pub struct DingTalkOptions {
    /// Full robot webhook URL.
    pub webhook_url: String,
    /// Signing secret; empty disables signing.
    pub secret: String,
}

pub struct DingTalkClient {
    options: DingTalkOptions,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RobotResponse {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

impl DingTalkClient {
    pub fn new(options: DingTalkOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }
}

#[async_trait]
impl Notifier for DingTalkClient {
    fn platform(&self) -> Platform {
        Platform::DingTalk
    }

    #[instrument(skip_all)]
    async fn send(&self, message: &str) -> Result<(), ProviderError> {
        require(&self.options.webhook_url, "webhook url")?;
        require_message(message)?;

        let mut request = build_client(self.timeout)?
            .post(self.options.webhook_url.trim())
            .json(&json!({ "msgtype": "text", "text": { "content": message } }));

        if !self.options.secret.is_empty() {
            let timestamp = Utc::now().timestamp_millis();
            let sign = webhook_signature(timestamp, &self.options.secret, true);
            debug!(timestamp, "Signing DingTalk request");
            request = request.query(&[("timestamp", timestamp.to_string()), ("sign", sign)]);
        }

        let response = request.send().await?;
        let reply: RobotResponse = json_or_status(Platform::DingTalk, response).await?;
        if reply.errcode != 0 {
            error!(
                errcode = reply.errcode,
                errmsg = %reply.errmsg,
                "DingTalk rejected the message"
            );
            return Err(ProviderError::Rejected(format!(
                "errcode {}: {}",
                reply.errcode, reply.errmsg
            )));
        }

        info!("Successfully sent DingTalk message.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_signed_request_keeps_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/robot/send"))
            .and(query_param("access_token", "abc"))
            .and(body_json(json!({ "msgtype": "text", "text": { "content": "hi" } })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "errcode": 0, "errmsg": "ok" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = DingTalkClient::new(
            DingTalkOptions {
                webhook_url: format!("{}/robot/send?access_token=abc", server.uri()),
                secret: "SEC123".to_string(),
            },
            Duration::from_secs(5),
        );
        assert!(client.send("hi").await.is_ok());

        let requests = server.received_requests().await.unwrap();
        let pairs: Vec<(String, String)> = requests[0]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.iter().any(|(k, _)| k == "timestamp"));
        assert!(pairs.iter().any(|(k, v)| k == "sign" && !v.is_empty()));
    }

    #[tokio::test]
    async fn test_errcode_is_a_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 310000,
                "errmsg": "sign not match"
            })))
            .mount(&server)
            .await;

        let client = DingTalkClient::new(
            DingTalkOptions {
                webhook_url: server.uri(),
                secret: String::new(),
            },
            Duration::from_secs(5),
        );
        let err = client.send("hi").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "provider rejected the message: errcode 310000: sign not match"
        );
    }
}
