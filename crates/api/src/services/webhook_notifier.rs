//! Webhook delivery for fired alert notifications.

use std::time::Duration;

use async_trait::async_trait;
use domain::services::{AlertNotificationPayload, AlertNotifier, NotificationResult};
use reqwest::Client;
use tracing::{debug, warn};

/// Posts each notification as JSON to a configured URL.
pub struct WebhookAlertNotifier {
    client: Client,
    url: String,
}

impl WebhookAlertNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AlertNotifier for WebhookAlertNotifier {
    async fn notify(&self, payload: AlertNotificationPayload) -> NotificationResult {
        let response = self
            .client
            .post(&self.url)
            .header("X-Event-Type", payload.notification_type.to_string())
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!(
                    user_id = %payload.user_id,
                    status = resp.status().as_u16(),
                    "Alert notification delivered"
                );
                NotificationResult::Sent
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                warn!(user_id = %payload.user_id, status, "Alert webhook rejected notification");
                NotificationResult::Failed(format!("HTTP {}", status))
            }
            Err(e) => {
                warn!(user_id = %payload.user_id, error = %e, "Alert webhook request failed");
                NotificationResult::Failed(e.to_string())
            }
        }
    }
}
