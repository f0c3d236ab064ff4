//! Triggers PagerDuty incidents through the Events API v2.

use crate::core::{Notifier, Platform};
use crate::error::ProviderError;
use crate::notification::http::{base_url, build_client, ensure_success};
use crate::notification::{require, require_message};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{info, instrument};

pub const API_URL: &str = "https://events.pagerduty.com/v2/enqueue";

/// The API rejects summaries longer than this.
const MAX_SUMMARY_CHARS: usize = 1024;

const SEVERITIES: [&str; 4] = ["critical", "error", "warning", "info"];

#[derive(Debug, Clone, Default)]
pub struct PagerdutyOptions {
    /// Integration routing key.
    pub token: String,
    pub source: String,
    /// Empty means `critical`.
    pub severity: String,
    pub api_url: Option<String>,
}

pub struct PagerdutyClient {
    options: PagerdutyOptions,
    timeout: Duration,
}

impl PagerdutyClient {
    pub fn new(options: PagerdutyOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }

    fn severity(&self) -> Result<String, ProviderError> {
        let severity = self.options.severity.trim().to_ascii_lowercase();
        if severity.is_empty() {
            return Ok(SEVERITIES[0].to_string());
        }
        if !SEVERITIES.contains(&severity.as_str()) {
            return Err(ProviderError::invalid(
                "severity",
                format!("{severity:?} is not one of {}", SEVERITIES.join(", ")),
            ));
        }
        Ok(severity)
    }
}

#[async_trait]
impl Notifier for PagerdutyClient {
    fn platform(&self) -> Platform {
        Platform::Pagerduty
    }

    #[instrument(skip_all, fields(source = %self.options.source))]
    async fn send(&self, message: &str) -> Result<(), ProviderError> {
        require(&self.options.token, "routing key")?;
        require(&self.options.source, "source")?;
        require_message(message)?;
        let severity = self.severity()?;

        let summary: String = message.chars().take(MAX_SUMMARY_CHARS).collect();
        let event = json!({
            "routing_key": self.options.token,
            "event_action": "trigger",
            "payload": {
                "summary": summary,
                "source": self.options.source,
                "severity": severity,
            }
        });

        let response = build_client(self.timeout)?
            .post(base_url(self.options.api_url.as_deref(), API_URL))
            .json(&event)
            .send()
            .await?;
        ensure_success(Platform::Pagerduty, response).await?;

        info!(%severity, "PagerDuty event enqueued.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(server: &MockServer) -> PagerdutyOptions {
        PagerdutyOptions {
            token: "routing-key".to_string(),
            source: "billing-api".to_string(),
            severity: String::new(),
            api_url: Some(server.uri()),
        }
    }

    #[tokio::test]
    async fn test_trigger_defaults_to_critical_and_truncates() {
        let server = MockServer::start().await;
        let long_message = "x".repeat(MAX_SUMMARY_CHARS + 10);
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "routing_key": "routing-key",
                "event_action": "trigger",
                "payload": {
                    "summary": "x".repeat(MAX_SUMMARY_CHARS),
                    "severity": "critical",
                    "source": "billing-api"
                }
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "status": "success",
                "message": "Event processed",
                "dedup_key": "abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = PagerdutyClient::new(options(&server), Duration::from_secs(5))
            .send(&long_message)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_severity_is_rejected_locally() {
        let server = MockServer::start().await;
        let client = PagerdutyClient::new(
            PagerdutyOptions {
                severity: "apocalyptic".to_string(),
                ..options(&server)
            },
            Duration::from_secs(5),
        );

        let err = client.send("hello").await.unwrap_err();

        assert!(err.is_validation());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_request_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "invalid event",
                "errors": ["'routing_key' is invalid"]
            })))
            .mount(&server)
            .await;

        let err = PagerdutyClient::new(options(&server), Duration::from_secs(5))
            .send("hello")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Status { status, .. } if status.as_u16() == 400));
    }
}
