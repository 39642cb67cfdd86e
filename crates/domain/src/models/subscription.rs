//! Subscription record domain model.
//!
//! A subscription record is the raw input of alert classification: one row
//! per member carrying the two dates the classifier looks at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::dates::parse_flexible_date;

/// Raw subscription record as returned by an alert source.
///
/// Dates stay as strings here: external sources are not trusted to send
/// well-formed values, and a bad date must only disable the condition that
/// depends on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub subscription_end_date: Option<String>,
    #[serde(default)]
    pub renewal_reminder_date: Option<String>,
}

impl SubscriptionRecord {
    /// Builds a record from already-typed dates (database rows).
    pub fn from_dates(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        subscription_end_date: Option<DateTime<Utc>>,
        renewal_reminder_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_email: user_email.into(),
            subscription_end_date: subscription_end_date.map(|d| d.to_rfc3339()),
            renewal_reminder_date: renewal_reminder_date.map(|d| d.to_rfc3339()),
        }
    }

    /// Parsed subscription end date, if present and well-formed.
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.subscription_end_date
            .as_deref()
            .and_then(parse_flexible_date)
    }

    /// Parsed renewal reminder date, if present and well-formed.
    pub fn reminder_date(&self) -> Option<DateTime<Utc>> {
        self.renewal_reminder_date
            .as_deref()
            .and_then(parse_flexible_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_external_record() {
        let json = r#"{
            "userId": "65f1c2aa9b1e4a0012345678",
            "userName": "Dana Okafor",
            "userEmail": "dana@example.com",
            "subscriptionEndDate": "2024-06-01T00:00:00.000Z",
            "renewalReminderDate": "2024-05-29"
        }"#;

        let record: SubscriptionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.user_id, "65f1c2aa9b1e4a0012345678");
        assert_eq!(
            record.end_date(),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            record.reminder_date(),
            Some(Utc.with_ymd_and_hms(2024, 5, 29, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let json = r#"{"userId": "u-1"}"#;
        let record: SubscriptionRecord = serde_json::from_str(json).unwrap();
        assert!(record.user_name.is_empty());
        assert!(record.end_date().is_none());
        assert!(record.reminder_date().is_none());
    }

    #[test]
    fn test_malformed_date_is_none() {
        let record = SubscriptionRecord {
            user_id: "u-2".into(),
            user_name: "Sam".into(),
            user_email: "sam@example.com".into(),
            subscription_end_date: Some("soon".into()),
            renewal_reminder_date: Some("2024-05-29".into()),
        };
        assert!(record.end_date().is_none());
        assert!(record.reminder_date().is_some());
    }

    #[test]
    fn test_from_dates_roundtrips_through_parser() {
        let end = Utc.with_ymd_and_hms(2024, 7, 4, 18, 30, 0).unwrap();
        let record = SubscriptionRecord::from_dates("u-3", "Lee", "lee@example.com", Some(end), None);
        assert_eq!(record.end_date(), Some(end));
        assert!(record.renewal_reminder_date.is_none());
    }
}
