//! Route handlers.

pub mod alert_preferences;
pub mod alert_sessions;
pub mod health;
pub mod loyalty;
pub mod members;
pub mod rewards;
pub mod subscription_alerts;
