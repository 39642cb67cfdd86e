//! Alert preference domain model.
//!
//! Preferences are owned by a dashboard client and persisted as four
//! string values in a key-value store.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Storage key for the sound toggle.
pub const SOUND_ENABLED_KEY: &str = "subscriptionAlerts.soundEnabled";
/// Storage key for the browser notification toggle.
pub const NOTIFICATION_ENABLED_KEY: &str = "subscriptionAlerts.notificationEnabled";
/// Storage key for the expiry alert threshold.
pub const ALERT_THRESHOLD_DAYS_KEY: &str = "subscriptionAlerts.alertThresholdDays";
/// Storage key for the renewal reminder threshold.
pub const REMINDER_THRESHOLD_DAYS_KEY: &str = "subscriptionAlerts.reminderThresholdDays";

pub const DEFAULT_ALERT_THRESHOLD_DAYS: i32 = 3;
pub const DEFAULT_REMINDER_THRESHOLD_DAYS: i32 = 1;

/// User-configurable alert preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPreferences {
    pub sound_enabled: bool,
    pub notification_enabled: bool,
    pub alert_threshold_days: i32,
    pub reminder_threshold_days: i32,
}

impl Default for AlertPreferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notification_enabled: true,
            alert_threshold_days: DEFAULT_ALERT_THRESHOLD_DAYS,
            reminder_threshold_days: DEFAULT_REMINDER_THRESHOLD_DAYS,
        }
    }
}

impl AlertPreferences {
    /// Serializes into `(key, value)` pairs in storage form.
    pub fn to_entries(&self) -> [(&'static str, String); 4] {
        [
            (SOUND_ENABLED_KEY, self.sound_enabled.to_string()),
            (NOTIFICATION_ENABLED_KEY, self.notification_enabled.to_string()),
            (ALERT_THRESHOLD_DAYS_KEY, self.alert_threshold_days.to_string()),
            (
                REMINDER_THRESHOLD_DAYS_KEY,
                self.reminder_threshold_days.to_string(),
            ),
        ]
    }

    /// Rebuilds preferences from stored values.
    ///
    /// `lookup` returns the raw string for a key. Missing or unparsable
    /// values fall back to the defaults. Thresholds are not range-checked
    /// here; that happens on [`UpdateAlertPreferencesRequest`].
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let sound_enabled = lookup(SOUND_ENABLED_KEY)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.sound_enabled);
        let notification_enabled = lookup(NOTIFICATION_ENABLED_KEY)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.notification_enabled);
        let alert_threshold_days = lookup(ALERT_THRESHOLD_DAYS_KEY)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(defaults.alert_threshold_days);
        let reminder_threshold_days = lookup(REMINDER_THRESHOLD_DAYS_KEY)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(defaults.reminder_threshold_days);

        Self {
            sound_enabled,
            notification_enabled,
            alert_threshold_days,
            reminder_threshold_days,
        }
    }

    /// Applies a partial update.
    pub fn apply(&mut self, update: &UpdateAlertPreferencesRequest) {
        if let Some(v) = update.sound_enabled {
            self.sound_enabled = v;
        }
        if let Some(v) = update.notification_enabled {
            self.notification_enabled = v;
        }
        if let Some(v) = update.alert_threshold_days {
            self.alert_threshold_days = v;
        }
        if let Some(v) = update.reminder_threshold_days {
            self.reminder_threshold_days = v;
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Request payload for updating preferences (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertPreferencesRequest {
    pub sound_enabled: Option<bool>,

    pub notification_enabled: Option<bool>,

    #[validate(range(min = 1, max = 30, message = "Alert threshold must be between 1 and 30 days"))]
    pub alert_threshold_days: Option<i32>,

    #[validate(range(min = 1, max = 7, message = "Reminder threshold must be between 1 and 7 days"))]
    pub reminder_threshold_days: Option<i32>,
}
