//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Smallest accepted expiry alert threshold, in days.
pub const MIN_ALERT_THRESHOLD_DAYS: i32 = 1;
/// Largest accepted expiry alert threshold, in days.
pub const MAX_ALERT_THRESHOLD_DAYS: i32 = 30;
/// Smallest accepted renewal reminder threshold, in days.
pub const MIN_REMINDER_THRESHOLD_DAYS: i32 = 1;
/// Largest accepted renewal reminder threshold, in days.
pub const MAX_REMINDER_THRESHOLD_DAYS: i32 = 7;

/// Stock value meaning "no stock limit".
pub const UNLIMITED_STOCK: i32 = -1;

/// Validates the expiry alert threshold (1 to 30 days).
pub fn validate_alert_threshold_days(days: i32) -> Result<(), ValidationError> {
    if (MIN_ALERT_THRESHOLD_DAYS..=MAX_ALERT_THRESHOLD_DAYS).contains(&days) {
        Ok(())
    } else {
        let mut err = ValidationError::new("alert_threshold_range");
        err.message = Some("Alert threshold must be between 1 and 30 days".into());
        Err(err)
    }
}

/// Validates the renewal reminder threshold (1 to 7 days).
pub fn validate_reminder_threshold_days(days: i32) -> Result<(), ValidationError> {
    if (MIN_REMINDER_THRESHOLD_DAYS..=MAX_REMINDER_THRESHOLD_DAYS).contains(&days) {
        Ok(())
    } else {
        let mut err = ValidationError::new("reminder_threshold_range");
        err.message = Some("Reminder threshold must be between 1 and 7 days".into());
        Err(err)
    }
}

/// Ledger entries must move the balance.
pub fn validate_points_delta(points: i32) -> Result<(), ValidationError> {
    if points != 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("points_zero");
        err.message = Some("Points must be non-zero".into());
        Err(err)
    }
}

/// Stock is either a non-negative count or -1 for unlimited.
pub fn validate_stock(stock: i32) -> Result<(), ValidationError> {
    if stock >= UNLIMITED_STOCK {
        Ok(())
    } else {
        let mut err = ValidationError::new("stock_range");
        err.message = Some("Stock must be -1 (unlimited) or a non-negative count".into());
        Err(err)
    }
}

/// A reward's expiry date must not already be in the past when it is set.
pub fn validate_valid_until(valid_until: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *valid_until > Utc::now() {
        Ok(())
    } else {
        let mut err = ValidationError::new("valid_until_past");
        err.message = Some("validUntil must be in the future".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_alert_threshold_days() {
        assert!(validate_alert_threshold_days(1).is_ok());
        assert!(validate_alert_threshold_days(3).is_ok());
        assert!(validate_alert_threshold_days(30).is_ok());
        assert!(validate_alert_threshold_days(0).is_err());
        assert!(validate_alert_threshold_days(31).is_err());
    }

    #[test]
    fn test_validate_alert_threshold_error_message() {
        let err = validate_alert_threshold_days(45).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Alert threshold must be between 1 and 30 days"
        );
    }

    #[test]
    fn test_validate_reminder_threshold_days() {
        assert!(validate_reminder_threshold_days(1).is_ok());
        assert!(validate_reminder_threshold_days(7).is_ok());
        assert!(validate_reminder_threshold_days(0).is_err());
        assert!(validate_reminder_threshold_days(8).is_err());
    }

    #[test]
    fn test_validate_points_delta() {
        assert!(validate_points_delta(10).is_ok());
        assert!(validate_points_delta(-10).is_ok());
        assert!(validate_points_delta(0).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(UNLIMITED_STOCK).is_ok());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(250).is_ok());
        assert!(validate_stock(-2).is_err());
    }

    #[test]
    fn test_validate_valid_until() {
        let tomorrow = Utc::now() + Duration::days(1);
        let yesterday = Utc::now() - Duration::days(1);
        assert!(validate_valid_until(&tomorrow).is_ok());
        let err = validate_valid_until(&yesterday).unwrap_err();
        assert_eq!(err.code, "valid_until_past");
    }
}
