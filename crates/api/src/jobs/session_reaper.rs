//! Drops alert sessions whose consumer stopped polling without unmounting.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::services::AlertSessionRegistry;

use super::scheduler::{Job, JobFrequency};

pub struct SessionReaperJob {
    sessions: Arc<AlertSessionRegistry>,
    idle_timeout_secs: u64,
}

impl SessionReaperJob {
    pub fn new(sessions: Arc<AlertSessionRegistry>, idle_timeout_secs: u64) -> Self {
        Self {
            sessions,
            idle_timeout_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for SessionReaperJob {
    fn name(&self) -> &'static str {
        "alert_session_reaper"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(1)
    }

    async fn execute(&self) -> Result<(), String> {
        let idle = chrono::Duration::seconds(
            i64::try_from(self.idle_timeout_secs).map_err(|e| e.to_string())?,
        );
        let removed = self.sessions.remove_idle(Utc::now() - idle).await;
        if removed > 0 {
            info!(removed, "Removed idle alert sessions");
        }
        Ok(())
    }
}
