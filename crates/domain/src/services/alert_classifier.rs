//! Subscription alert classification.
//!
//! Decides, for one subscription record, whether it needs an alert and how
//! urgent it is. Pure and synchronous: callers supply `now`.

use chrono::{DateTime, Utc};
use shared::dates::days_until;

use crate::models::{
    AlertPreferences, AlertSeverity, AlertType, SubscriptionAlert, SubscriptionRecord,
};

/// Default day count at or below which an alert is critical.
pub const DEFAULT_CRITICAL_THRESHOLD_DAYS: i64 = 2;

/// Thresholds that drive classification. All comparisons are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    pub alert_threshold_days: i64,
    pub reminder_threshold_days: i64,
    pub critical_threshold_days: i64,
}

impl AlertThresholds {
    pub fn new(alert_threshold_days: i64, reminder_threshold_days: i64) -> Self {
        Self {
            alert_threshold_days,
            reminder_threshold_days,
            critical_threshold_days: DEFAULT_CRITICAL_THRESHOLD_DAYS,
        }
    }

    pub fn with_critical_threshold(mut self, critical_threshold_days: i64) -> Self {
        self.critical_threshold_days = critical_threshold_days;
        self
    }

    /// Thresholds taken from a consumer's preferences.
    pub fn from_preferences(prefs: &AlertPreferences, critical_threshold_days: i64) -> Self {
        Self {
            alert_threshold_days: i64::from(prefs.alert_threshold_days),
            reminder_threshold_days: i64::from(prefs.reminder_threshold_days),
            critical_threshold_days,
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        let prefs = AlertPreferences::default();
        Self::from_preferences(&prefs, DEFAULT_CRITICAL_THRESHOLD_DAYS)
    }
}

/// Classifies a single record. Returns `None` when neither condition holds
/// or when the record has no usable date.
pub fn classify(
    record: &SubscriptionRecord,
    thresholds: &AlertThresholds,
    now: DateTime<Utc>,
) -> Option<SubscriptionAlert> {
    let end_date = record.end_date();
    let reminder_date = record.reminder_date();

    let days_until_expiry = end_date.map(|d| days_until(d, now));
    let days_until_reminder = reminder_date.map(|d| days_until(d, now));

    let expiry_triggered = days_until_expiry
        .map(|d| d <= thresholds.alert_threshold_days)
        .unwrap_or(false);
    let reminder_triggered = days_until_reminder
        .map(|d| d <= thresholds.reminder_threshold_days)
        .unwrap_or(false);

    let alert_type = match (expiry_triggered, reminder_triggered) {
        (true, true) => AlertType::Both,
        (true, false) => AlertType::Expiry,
        (false, true) => AlertType::Reminder,
        (false, false) => return None,
    };

    let trigger_days = [
        days_until_expiry.filter(|_| expiry_triggered),
        days_until_reminder.filter(|_| reminder_triggered),
    ]
    .into_iter()
    .flatten()
    .min()?;

    let severity = if trigger_days <= thresholds.critical_threshold_days {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    };

    Some(SubscriptionAlert {
        user_id: record.user_id.clone(),
        user_name: record.user_name.clone(),
        user_email: record.user_email.clone(),
        subscription_end_date: end_date,
        renewal_reminder_date: reminder_date,
        days_until_expiry,
        days_until_reminder,
        alert_type,
        severity,
    })
}

/// Classifies a batch of records.
///
/// Output order: critical before warning, then fewest days first, then by
/// user id so that equal polls produce identical lists.
pub fn classify_all(
    records: &[SubscriptionRecord],
    thresholds: &AlertThresholds,
    now: DateTime<Utc>,
) -> Vec<SubscriptionAlert> {
    let mut alerts: Vec<SubscriptionAlert> = records
        .iter()
        .filter_map(|r| classify(r, thresholds, now))
        .collect();

    alerts.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.trigger_days().cmp(&b.trigger_days()))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    alerts
}
