//! Subscription alert polling job.
//!
//! Fetches subscription records, classifies them and publishes the result
//! to the [`AlertHub`]. A failed fetch keeps the previous snapshot.

use std::sync::Arc;

use crate::services::{AlertHub, AlertSource};

use super::scheduler::{Job, JobFrequency};

pub struct SubscriptionAlertPollJob {
    hub: Arc<AlertHub>,
    source: Arc<dyn AlertSource>,
    interval_secs: u64,
}

impl SubscriptionAlertPollJob {
    pub fn new(hub: Arc<AlertHub>, source: Arc<dyn AlertSource>, interval_secs: u64) -> Self {
        Self {
            hub,
            source,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for SubscriptionAlertPollJob {
    fn name(&self) -> &'static str {
        "subscription_alert_poll"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        self.hub
            .refresh(self.source.as_ref())
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to refresh subscription alerts: {}", e))
    }
}
