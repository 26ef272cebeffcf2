//! Discord webhook notifier for banned-word hits (§4.3 Stage A). Best-effort
//! and non-blocking from the caller's perspective: failures are logged, never
//! propagated into the moderation pipeline.

use std::time::Duration;

#[derive(Clone)]
pub struct DiscordWebhookClient {
    client: reqwest::Client,
}

impl Default for DiscordWebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscordWebhookClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build discord webhook http client");
        Self { client }
    }

    /// Fire-and-forget notification. Errors are logged here, not returned,
    /// so a Discord outage can never affect the banned-word dispatch itself.
    pub async fn notify(&self, webhook_url: &str, message: &str) {
        let body = serde_json::json!({ "content": message });
        if let Err(err) = self.client.post(webhook_url).json(&body).send().await {
            tracing::warn!(%err, "discord webhook delivery failed");
        }
    }
}
