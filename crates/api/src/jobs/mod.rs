//! Background job scheduler and job implementations.

mod scheduler;
mod session_reaper;
mod subscription_alert_poll;

pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use session_reaper::SessionReaperJob;
pub use subscription_alert_poll::SubscriptionAlertPollJob;
