//! Webhook delivery
//!
//! Posts the report as JSON to the configured endpoint in a single attempt.
//! The endpoint URL embeds a secret token, so only its host ever appears in
//! logs and errors.

use crate::config::WebhookConfig;
use crate::output::limits::SUCCESS_STATUSES;
use crate::output::payload::WebhookPayload;
use crate::output::traits::Reporter;
use crate::DeliveryError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Delivers reports to a Discord-compatible webhook
#[derive(Debug, Clone)]
pub struct WebhookReporter {
    client: Client,
    url: Url,
}

impl WebhookReporter {
    /// Creates a reporter from the webhook configuration
    ///
    /// # Returns
    ///
    /// * `Ok(WebhookReporter)` - Ready to deliver
    /// * `Err(DeliveryError::MissingWebhook)` - No URL is configured
    /// * `Err(DeliveryError::Transport)` - The configured URL does not parse
    pub fn new(config: &WebhookConfig) -> Result<Self, DeliveryError> {
        let raw = config.url.as_deref().ok_or(DeliveryError::MissingWebhook)?;
        let url = Url::parse(raw).map_err(|e| DeliveryError::Transport {
            host: "<unparsable>".to_string(),
            message: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(DeliveryError::Client)?;

        Ok(Self { client, url })
    }

    fn host(&self) -> String {
        self.url.host_str().unwrap_or("<unknown>").to_string()
    }
}

impl Reporter for WebhookReporter {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                host: self.host(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status().as_u16();
        if SUCCESS_STATUSES.contains(&status) {
            tracing::info!("Webhook at {} accepted the report ({})", self.host(), status);
            return Ok(());
        }

        let body = rejection_body(response.text().await);
        Err(DeliveryError::Rejected { status, body })
    }
}

/// Response body for a rejection, or the reason it could not be read
fn rejection_body(body: Result<String, reqwest::Error>) -> String {
    body.unwrap_or_else(|e| format!("<unreadable body: {}>", e.without_url()))
}
