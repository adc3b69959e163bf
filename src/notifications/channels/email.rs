// Email channel - POSTs the rendered alert to the backend send endpoint
//
// Fire-and-forget from the dispatcher's perspective: a 2xx response is
// success, any other status or network error is a failure for this channel
// only. No retry, no backoff.

use super::EmailTransport;
use crate::notifications::templates::EmailContent;
use anyhow::{bail, Context, Result};
use serde_json::json;
use std::time::Duration;

pub struct HttpEmailTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEmailTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        // Short timeout: an alert email that takes longer than this is not
        // worth holding a dispatch open for.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl EmailTransport for HttpEmailTransport {
    async fn send(&self, to: &str, content: &EmailContent) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "to": to,
                "subject": content.subject,
                "text": content.text,
                "html": content.html,
            }))
            .send()
            .await
            .context("Email send request failed")?;

        if !response.status().is_success() {
            bail!("Email endpoint returned {}", response.status());
        }
        Ok(())
    }
}
