//! HTTP plumbing shared by the webhook and REST adapters.

use crate::core::Platform;
use crate::error::ProviderError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::error;

/// Builds the client an adapter uses for its single call.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("notify-hub/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::Http)
}

/// Resolves the endpoint base, preferring an explicit override.
pub(crate) fn base_url<'a>(override_url: Option<&'a str>, default: &'a str) -> &'a str {
    override_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
}

/// Turns a non-2xx response into `ProviderError::Status`, logging the body.
pub(crate) async fn ensure_success(
    platform: Platform,
    response: Response,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(
        %platform,
        status = %status,
        body = %body,
        "Provider returned an error status"
    );
    Err(ProviderError::Status { status, body })
}

/// Reads a JSON body, accepting error statuses if the body still parses.
///
/// Several providers report rejections as a JSON document on a 4xx status;
/// those are better surfaced through the document than as a bare status.
pub(crate) async fn json_or_status<T: DeserializeOwned>(
    platform: Platform,
    response: Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    match serde_json::from_str::<T>(&body) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            error!(
                %platform,
                status = %status,
                body = %body,
                error = %e,
                "Provider response could not be decoded"
            );
            if status.is_success() {
                Err(ProviderError::Rejected(format!(
                    "undecodable response: {e}"
                )))
            } else {
                Err(ProviderError::Status { status, body })
            }
        }
    }
}
