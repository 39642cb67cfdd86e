//! Application services: alert polling, consumer sessions and delivery.

pub mod alert_hub;
pub mod alert_sessions;
pub mod alert_source;
pub mod loyalty_stats;
pub mod webhook_notifier;

pub use alert_hub::{AlertFeed, AlertHub};
pub use alert_sessions::{AlertSessionRegistry, SessionInfo};
pub use alert_source::{
    AlertSource, DatabaseAlertSource, HttpAlertSource, SourceError, StaticAlertSource,
};
pub use loyalty_stats::LoyaltyStatsStore;
pub use webhook_notifier::WebhookAlertNotifier;
