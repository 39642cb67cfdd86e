//! Sources of subscription records for the alert poller.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use domain::models::{Member, SubscriptionRecord};
use persistence::repositories::MemberRepository;
use reqwest::Client;
use thiserror::Error;

/// Errors that can occur while fetching subscription records.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Anything that can list the subscriptions to classify.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError>;
}

/// Reads active members whose dates fall inside the candidate window.
pub struct DatabaseAlertSource {
    repo: MemberRepository,
    window_days: i64,
    timeout: Duration,
}

impl DatabaseAlertSource {
    pub fn new(repo: MemberRepository, window_days: i64, timeout: Duration) -> Self {
        Self {
            repo,
            window_days,
            timeout,
        }
    }
}

#[async_trait]
impl AlertSource for DatabaseAlertSource {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError> {
        let horizon = Utc::now() + chrono::Duration::days(self.window_days);
        let members = tokio::time::timeout(self.timeout, self.repo.find_alert_candidates(horizon))
            .await
            .map_err(|_| SourceError::Timeout(self.timeout))??;

        Ok(members
            .into_iter()
            .map(|entity| Member::from(entity).to_subscription_record())
            .collect())
    }
}

/// Calls an external endpoint that returns a JSON array of records.
pub struct HttpAlertSource {
    client: Client,
    url: String,
}

impl HttpAlertSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AlertSource for HttpAlertSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError> {
        let records = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<SubscriptionRecord>>()
            .await?;

        tracing::debug!(url = %self.url, count = records.len(), "Fetched subscription records");
        Ok(records)
    }
}

/// Fixed record list. Used when the service runs without a live source and
/// in tests.
#[derive(Default)]
pub struct StaticAlertSource {
    records: tokio::sync::RwLock<Vec<SubscriptionRecord>>,
}

impl StaticAlertSource {
    pub fn new(records: Vec<SubscriptionRecord>) -> Self {
        Self {
            records: tokio::sync::RwLock::new(records),
        }
    }

    /// Replaces the records returned by the next fetch.
    pub async fn set(&self, records: Vec<SubscriptionRecord>) {
        *self.records.write().await = records;
    }
}

#[async_trait]
impl AlertSource for StaticAlertSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError> {
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> SubscriptionRecord {
        SubscriptionRecord {
            user_id: id.to_string(),
            user_name: format!("Member {}", id),
            user_email: format!("{}@gym.test", id),
            subscription_end_date: Some("2024-06-03".to_string()),
            renewal_reminder_date: None,
        }
    }

    #[tokio::test]
    async fn test_static_source_returns_current_records() {
        let source = StaticAlertSource::new(vec![record("u1")]);
        assert_eq!(source.fetch().await.unwrap().len(), 1);

        source.set(vec![record("u1"), record("u2")]).await;
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].user_id, "u2");
        assert_eq!(source.name(), "static");
    }

    #[test]
    fn test_http_source_builds() {
        let source = HttpAlertSource::new("http://localhost:9/records", Duration::from_secs(1))
            .expect("client builds");
        assert_eq!(source.name(), "http");
        assert_eq!(source.url, "http://localhost:9/records");
    }

    #[tokio::test]
    async fn test_http_source_decodes_record_array() {
        use axum::{routing::get, Json, Router};

        let app = Router::new().route(
            "/api/subscriptions",
            get(|| async {
                Json(serde_json::json!([
                    {
                        "userId": "m-17",
                        "userName": "Dana Kowalski",
                        "userEmail": "dana@gym.test",
                        "subscriptionEndDate": "2024-06-03",
                        "renewalReminderDate": null
                    },
                    {
                        "userId": "m-18",
                        "userName": "Ola Nowak",
                        "userEmail": "ola@gym.test",
                        "subscriptionEndDate": null,
                        "renewalReminderDate": "2024-06-01T09:00:00Z"
                    }
                ]))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let source = HttpAlertSource::new(
            format!("http://{}/api/subscriptions", addr),
            Duration::from_secs(5),
        )
        .unwrap();
        let records = source.fetch().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            SubscriptionRecord {
                user_id: "m-17".to_string(),
                user_name: "Dana Kowalski".to_string(),
                user_email: "dana@gym.test".to_string(),
                subscription_end_date: Some("2024-06-03".to_string()),
                renewal_reminder_date: None,
            }
        );
        assert_eq!(records[1].subscription_end_date, None);
        assert_eq!(
            records[1].renewal_reminder_date.as_deref(),
            Some("2024-06-01T09:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_http_source_unreachable_is_error() {
        // Port 9 (discard) is closed on test hosts.
        let source =
            HttpAlertSource::new("http://127.0.0.1:9/records", Duration::from_millis(500)).unwrap();
        assert!(matches!(source.fetch().await, Err(SourceError::Http(_))));
    }

    #[test]
    fn test_timeout_message() {
        let err = SourceError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Fetch timed out after 10s");
    }
}
