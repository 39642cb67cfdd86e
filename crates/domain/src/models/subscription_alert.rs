//! Subscription alert domain model.
//!
//! Alerts are derived data: they are recomputed on every poll from the
//! subscription records and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which condition raised the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Expiry,
    Reminder,
    Both,
}

impl AlertType {
    /// Whether the subscription end date triggered this alert.
    pub fn includes_expiry(&self) -> bool {
        matches!(self, AlertType::Expiry | AlertType::Both)
    }

    /// Whether the renewal reminder date triggered this alert.
    pub fn includes_reminder(&self) -> bool {
        matches!(self, AlertType::Reminder | AlertType::Both)
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertType::Expiry => write!(f, "expiry"),
            AlertType::Reminder => write!(f, "reminder"),
            AlertType::Both => write!(f, "both"),
        }
    }
}

/// Alert severity. Critical alerts sort first and are the only ones that
/// produce notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Critical => write!(f, "critical"),
            AlertSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A subscription that is close to expiry or due for a renewal reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAlert {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub renewal_reminder_date: Option<DateTime<Utc>>,
    pub days_until_expiry: Option<i64>,
    pub days_until_reminder: Option<i64>,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
}

impl SubscriptionAlert {
    /// Smallest day count among the conditions that fired.
    pub fn trigger_days(&self) -> i64 {
        let expiry = self
            .days_until_expiry
            .filter(|_| self.alert_type.includes_expiry());
        let reminder = self
            .days_until_reminder
            .filter(|_| self.alert_type.includes_reminder());
        match (expiry, reminder) {
            (Some(e), Some(r)) => e.min(r),
            (Some(e), None) => e,
            (None, Some(r)) => r,
            (None, None) => i64::MAX,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

/// One published poll result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSnapshot {
    pub alerts: Vec<SubscriptionAlert>,
    pub critical_count: usize,
    pub warning_count: usize,
    /// When the snapshot was produced; `None` before the first poll.
    pub generated_at: Option<DateTime<Utc>>,
    /// Number of successful polls so far.
    pub cycle: u64,
}

impl AlertSnapshot {
    /// Snapshot published before the first poll completes.
    pub fn empty() -> Self {
        Self {
            alerts: Vec::new(),
            critical_count: 0,
            warning_count: 0,
            generated_at: None,
            cycle: 0,
        }
    }

    pub fn new(alerts: Vec<SubscriptionAlert>, generated_at: DateTime<Utc>, cycle: u64) -> Self {
        let critical_count = alerts.iter().filter(|a| a.is_critical()).count();
        let warning_count = alerts.len() - critical_count;
        Self {
            alerts,
            critical_count,
            warning_count,
            generated_at: Some(generated_at),
            cycle,
        }
    }

    pub fn total(&self) -> usize {
        self.alerts.len()
    }

    pub fn summary(&self) -> AlertSummary {
        AlertSummary {
            total: self.total(),
            critical: self.critical_count,
            warning: self.warning_count,
            has_critical: self.critical_count > 0,
            generated_at: self.generated_at,
        }
    }
}

impl Default for AlertSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Badge counters for the dashboard header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub has_critical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}
