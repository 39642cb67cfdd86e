//! Outbound alert notifications.
//!
//! When a consumer's gate lets a critical alert through, the alert is also
//! handed to an [`AlertNotifier`] so that server-side channels (webhooks,
//! logs) see the same notification the browser shows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AlertSeverity, AlertType, SubscriptionAlert};

/// Notification type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    SubscriptionAlert,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::SubscriptionAlert => write!(f, "subscription_alert"),
        }
    }
}

/// Payload for one critical alert notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotificationPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Consumer whose gate fired.
    pub owner_id: String,
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub body: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

impl AlertNotificationPayload {
    pub fn from_alert(owner_id: &str, alert: &SubscriptionAlert, timestamp: DateTime<Utc>) -> Self {
        let title = match alert.alert_type {
            AlertType::Expiry => "Subscription expiring",
            AlertType::Reminder => "Renewal reminder due",
            AlertType::Both => "Subscription expiring, renewal due",
        }
        .to_string();

        Self {
            notification_type: NotificationType::SubscriptionAlert,
            owner_id: owner_id.to_string(),
            user_id: alert.user_id.clone(),
            user_name: alert.user_name.clone(),
            title,
            body: describe(alert),
            alert_type: alert.alert_type,
            severity: alert.severity,
            timestamp,
        }
    }
}

fn describe(alert: &SubscriptionAlert) -> String {
    let when = match alert.trigger_days() {
        d if d < -1 => format!("{} days ago", -d),
        -1 => "1 day ago".to_string(),
        0 => "today".to_string(),
        1 => "in 1 day".to_string(),
        d => format!("in {} days", d),
    };
    match alert.alert_type {
        AlertType::Reminder => format!("{}'s renewal reminder is due {}", alert.user_name, when),
        AlertType::Expiry | AlertType::Both => {
            let verb = if alert.trigger_days() < 0 { "expired" } else { "expires" };
            format!("{}'s subscription {} {}", alert.user_name, verb, when)
        }
    }
}

/// Result of a notification send attempt.
#[derive(Debug, Clone)]
pub enum NotificationResult {
    /// Notification was delivered.
    Sent,
    /// Delivery failed (non-blocking for the caller).
    Failed(String),
    /// No channel configured.
    Skipped,
}

/// Sink for critical alert notifications.
#[async_trait::async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, payload: AlertNotificationPayload) -> NotificationResult;
}

/// Notifier that only logs.
///
/// Used when no webhook is configured and in tests.
#[derive(Debug, Clone, Default)]
pub struct LoggingAlertNotifier {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl LoggingAlertNotifier {
    pub fn new() -> Self {
        Self {
            simulate_failure: false,
        }
    }

    /// A notifier that reports every send as failed.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }
}

#[async_trait::async_trait]
impl AlertNotifier for LoggingAlertNotifier {
    async fn notify(&self, payload: AlertNotificationPayload) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(
                owner_id = %payload.owner_id,
                user_id = %payload.user_id,
                "Logging notifier simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            owner_id = %payload.owner_id,
            user_id = %payload.user_id,
            alert_type = %payload.alert_type,
            severity = %payload.severity,
            title = %payload.title,
            "Subscription alert notification"
        );

        NotificationResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(alert_type: AlertType, days: i64) -> SubscriptionAlert {
        SubscriptionAlert {
            user_id: "u-1".to_string(),
            user_name: "Priya".to_string(),
            user_email: "priya@example.com".to_string(),
            subscription_end_date: None,
            renewal_reminder_date: None,
            days_until_expiry: Some(days),
            days_until_reminder: Some(days),
            alert_type,
            severity: AlertSeverity::Critical,
        }
    }

    #[test]
    fn test_notification_type_display() {
        assert_eq!(
            NotificationType::SubscriptionAlert.to_string(),
            "subscription_alert"
        );
    }

    #[test]
    fn test_payload_text() {
        let payload =
            AlertNotificationPayload::from_alert("desk", &alert(AlertType::Expiry, 2), Utc::now());
        assert_eq!(payload.title, "Subscription expiring");
        assert_eq!(payload.body, "Priya's subscription expires in 2 days");

        let payload =
            AlertNotificationPayload::from_alert("desk", &alert(AlertType::Reminder, 0), Utc::now());
        assert_eq!(payload.body, "Priya's renewal reminder is due today");

        let payload =
            AlertNotificationPayload::from_alert("desk", &alert(AlertType::Both, -1), Utc::now());
        assert_eq!(payload.body, "Priya's subscription expired 1 day ago");
    }

    #[test]
    fn test_payload_serialization() {
        let payload =
            AlertNotificationPayload::from_alert("desk", &alert(AlertType::Expiry, 1), Utc::now());
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"type\":\"subscription_alert\""));
        assert!(json.contains("\"ownerId\":\"desk\""));
        assert!(json.contains("\"severity\":\"critical\""));
    }

    #[tokio::test]
    async fn test_logging_notifier_send() {
        let notifier = LoggingAlertNotifier::new();
        let payload =
            AlertNotificationPayload::from_alert("desk", &alert(AlertType::Expiry, 1), Utc::now());
        assert!(matches!(notifier.notify(payload).await, NotificationResult::Sent));
    }

    #[tokio::test]
    async fn test_logging_notifier_failure() {
        let notifier = LoggingAlertNotifier::failing();
        let payload =
            AlertNotificationPayload::from_alert("desk", &alert(AlertType::Expiry, 1), Utc::now());
        assert!(matches!(
            notifier.notify(payload).await,
            NotificationResult::Failed(_)
        ));
    }
}
