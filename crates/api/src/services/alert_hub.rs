//! Fan-out of poll results to every alert consumer.
//!
//! The poller publishes each fetch into a `watch` channel. Every publish
//! replaces the previous feed; receivers always see the latest one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::models::{AlertPreferences, AlertSnapshot, SubscriptionAlert, SubscriptionRecord};
use domain::services::{classify_all, AlertThresholds};
use tokio::sync::watch;
use tracing::{error, info};

use super::alert_source::{AlertSource, SourceError};
use crate::middleware::metrics::{record_active_alerts, record_alert_poll};

/// The latest fetch: raw records plus the snapshot classified with the
/// service-wide thresholds.
#[derive(Debug, Clone, Default)]
pub struct AlertFeed {
    pub records: Arc<Vec<SubscriptionRecord>>,
    pub snapshot: Arc<AlertSnapshot>,
}

impl AlertFeed {
    /// Reference time of the feed. Classifying against it keeps every
    /// consumer's view consistent with the published snapshot.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.generated_at
    }
}

pub struct AlertHub {
    tx: watch::Sender<AlertFeed>,
    thresholds: AlertThresholds,
}

impl AlertHub {
    pub fn new(thresholds: AlertThresholds) -> Self {
        let (tx, _rx) = watch::channel(AlertFeed::default());
        Self { tx, thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn subscribe(&self) -> watch::Receiver<AlertFeed> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> AlertFeed {
        self.tx.borrow().clone()
    }

    /// Number of live receivers besides the hub itself.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Classifies `records` and replaces the feed.
    pub fn publish(
        &self,
        records: Vec<SubscriptionRecord>,
        now: DateTime<Utc>,
    ) -> Arc<AlertSnapshot> {
        let alerts = classify_all(&records, &self.thresholds, now);
        let records = Arc::new(records);
        let mut published = Arc::new(AlertSnapshot::empty());

        self.tx.send_modify(|feed| {
            let snapshot = Arc::new(AlertSnapshot::new(alerts, now, feed.snapshot.cycle + 1));
            published = Arc::clone(&snapshot);
            *feed = AlertFeed { records, snapshot };
        });

        record_active_alerts(published.critical_count, published.warning_count);
        published
    }

    /// Runs one fetch and publishes it. On failure the previous feed stays
    /// in place.
    pub async fn refresh(
        &self,
        source: &dyn AlertSource,
    ) -> Result<Arc<AlertSnapshot>, SourceError> {
        match source.fetch().await {
            Ok(records) => {
                let fetched = records.len();
                let snapshot = self.publish(records, Utc::now());
                record_alert_poll(source.name(), true);
                info!(
                    source = source.name(),
                    records = fetched,
                    alerts = snapshot.total(),
                    critical = snapshot.critical_count,
                    cycle = snapshot.cycle,
                    "Subscription alerts refreshed"
                );
                Ok(snapshot)
            }
            Err(e) => {
                record_alert_poll(source.name(), false);
                error!(source = source.name(), error = %e, "Subscription alert fetch failed");
                Err(e)
            }
        }
    }

    /// The current feed classified with a consumer's own thresholds.
    pub fn snapshot_for(&self, prefs: &AlertPreferences) -> AlertSnapshot {
        let feed = self.current();
        let Some(fetched_at) = feed.fetched_at() else {
            return AlertSnapshot::empty();
        };

        let thresholds =
            AlertThresholds::from_preferences(prefs, self.thresholds.critical_threshold_days);
        if thresholds == self.thresholds {
            return (*feed.snapshot).clone();
        }

        let alerts: Vec<SubscriptionAlert> = classify_all(&feed.records, &thresholds, fetched_at);
        AlertSnapshot::new(alerts, fetched_at, feed.snapshot.cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::alert_source::StaticAlertSource;
    use async_trait::async_trait;
    use chrono::Duration;
    use domain::models::AlertType;

    fn record(
        id: &str,
        end_in_days: Option<i64>,
        reminder_in_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> SubscriptionRecord {
        SubscriptionRecord::from_dates(
            id.to_string(),
            format!("Member {}", id),
            format!("{}@gym.test", id),
            end_in_days.map(|d| now + Duration::days(d)),
            reminder_in_days.map(|d| now + Duration::days(d)),
        )
    }

    struct FailingSource;

    #[async_trait]
    impl AlertSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError> {
            Err(SourceError::Timeout(std::time::Duration::from_secs(1)))
        }
    }

    #[test]
    fn test_initial_feed_is_empty() {
        let hub = AlertHub::new(AlertThresholds::default());
        let feed = hub.current();
        assert!(feed.records.is_empty());
        assert_eq!(feed.snapshot.cycle, 0);
        assert!(feed.fetched_at().is_none());
    }

    #[test]
    fn test_publish_replaces_snapshot_and_counts_cycles() {
        let hub = AlertHub::new(AlertThresholds::default());
        let now = Utc::now();

        let first = hub.publish(vec![record("a", Some(2), Some(5), now)], now);
        assert_eq!(first.cycle, 1);
        assert_eq!(first.total(), 1);
        assert_eq!(first.alerts[0].alert_type, AlertType::Expiry);
        assert!(first.alerts[0].is_critical());

        let second = hub.publish(vec![], now);
        assert_eq!(second.cycle, 2);
        assert_eq!(hub.current().snapshot.total(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_publish() {
        let hub = AlertHub::new(AlertThresholds::default());
        let mut rx = hub.subscribe();
        let mut other = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        let now = Utc::now();
        hub.publish(vec![record("a", Some(1), None, now)], now);
        hub.publish(
            vec![record("b", Some(3), None, now), record("c", None, Some(0), now)],
            now,
        );

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().snapshot.cycle, 2);
        assert_eq!(rx.borrow().snapshot.total(), 2);

        other.changed().await.unwrap();
        assert_eq!(other.borrow_and_update().snapshot.cycle, 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_snapshot() {
        let hub = AlertHub::new(AlertThresholds::default());
        let source = StaticAlertSource::new(vec![record("a", Some(2), None, Utc::now())]);
        hub.refresh(&source).await.unwrap();

        assert!(hub.refresh(&FailingSource).await.is_err());
        let feed = hub.current();
        assert_eq!(feed.snapshot.cycle, 1);
        assert_eq!(feed.snapshot.total(), 1);
    }

    #[test]
    fn test_snapshot_for_uses_consumer_thresholds() {
        let hub = AlertHub::new(AlertThresholds::default());
        let now = Utc::now();
        hub.publish(
            vec![record("a", Some(5), None, now), record("b", Some(2), None, now)],
            now,
        );
        assert_eq!(hub.current().snapshot.total(), 1);

        let prefs = AlertPreferences {
            alert_threshold_days: 7,
            ..AlertPreferences::default()
        };
        let wide = hub.snapshot_for(&prefs);
        assert_eq!(wide.total(), 2);
        assert_eq!(wide.cycle, 1);
        assert_eq!(wide.generated_at, Some(now));

        let default_view = hub.snapshot_for(&AlertPreferences::default());
        assert_eq!(default_view.total(), 1);
    }

    #[test]
    fn test_snapshot_for_before_first_poll() {
        let hub = AlertHub::new(AlertThresholds::default());
        let snapshot = hub.snapshot_for(&AlertPreferences::default());
        assert_eq!(snapshot.cycle, 0);
        assert!(snapshot.alerts.is_empty());
    }
}
