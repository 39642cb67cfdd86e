//! Domain services for the gym alerts backend.
//!
//! Services contain business logic that operates on domain models.

pub mod alert_classifier;
pub mod alert_notifier;
pub mod loyalty_ledger;
pub mod notification_gate;
pub mod preferences;
pub mod redemption;

pub use alert_classifier::{classify, classify_all, AlertThresholds, DEFAULT_CRITICAL_THRESHOLD_DAYS};
pub use alert_notifier::{
    AlertNotificationPayload, AlertNotifier, LoggingAlertNotifier, NotificationResult,
    NotificationType,
};
pub use loyalty_ledger::{audit_ledger, next_balance, LedgerError};
pub use notification_gate::NotificationGate;
pub use preferences::{KeyValueStore, MemoryKeyValueStore, PreferencesStore, StoreError};
pub use redemption::{check_redemption, RedemptionContext, RedemptionError};
