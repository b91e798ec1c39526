use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

use crate::error::{compact_error_body, AppError};
use crate::model::signal::SignalPayload;

/// Posts signal payloads to automation webhooks.
pub struct WebhookNotifier {
    http: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook HTTP client")?;
        Ok(Self { http })
    }

    /// POST `payload` as JSON. Returns the HTTP status on success.
    pub async fn send(&self, url: &Url, payload: &SignalPayload) -> Result<u16> {
        let body = serde_json::to_string(payload).map_err(AppError::from)?;
        // The URL path carries the webhook secret, so only the host is logged.
        tracing::info!(
            host = url.host_str().unwrap_or_default(),
            signal = %payload.signal,
            payload = %body,
            "Sending webhook payload"
        );

        let response = self
            .http
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(AppError::from)
            .context("webhook POST failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Webhook {
                status: status.as_u16(),
                body: compact_error_body(&body),
            }
            .into());
        }
        Ok(status.as_u16())
    }
}
