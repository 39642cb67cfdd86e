use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::{AlertNotifier, AlertThresholds, LoggingAlertNotifier, PreferencesStore};
use persistence::repositories::{AlertPreferenceRepository, MemberRepository};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AlertSourceKind, Config};
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{
    alert_preferences, alert_sessions, health, loyalty, members, rewards, subscription_alerts,
};
use crate::services::{
    AlertHub, AlertSessionRegistry, AlertSource, DatabaseAlertSource, HttpAlertSource,
    LoyaltyStatsStore, WebhookAlertNotifier,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub hub: Arc<AlertHub>,
    pub source: Arc<dyn AlertSource>,
    pub sessions: Arc<AlertSessionRegistry>,
    pub preferences: PreferencesStore,
    pub notifier: Arc<dyn AlertNotifier>,
    pub loyalty_stats: Arc<LoyaltyStatsStore>,
}

impl AppState {
    /// Wires the alert pipeline from configuration.
    pub fn new(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let alerts = &config.alerts;
        let thresholds = AlertThresholds::new(
            i64::from(alerts.alert_threshold_days),
            i64::from(alerts.reminder_threshold_days),
        )
        .with_critical_threshold(alerts.critical_threshold_days);
        let fetch_timeout = Duration::from_secs(alerts.fetch_timeout_secs);

        let source: Arc<dyn AlertSource> = match alerts.source {
            AlertSourceKind::Database => Arc::new(DatabaseAlertSource::new(
                MemberRepository::new(pool.clone()),
                alerts.candidate_window_days,
                fetch_timeout,
            )),
            AlertSourceKind::Http => {
                Arc::new(HttpAlertSource::new(&alerts.source_url, fetch_timeout)?)
            }
        };

        let notifier: Arc<dyn AlertNotifier> = if config.notifier.enabled {
            Arc::new(WebhookAlertNotifier::new(
                &config.notifier.webhook_url,
                Duration::from_secs(config.notifier.timeout_secs),
            )?)
        } else {
            Arc::new(LoggingAlertNotifier::new())
        };

        let preferences =
            PreferencesStore::new(Arc::new(AlertPreferenceRepository::new(pool.clone())));

        Ok(Self {
            pool,
            config: Arc::new(config),
            hub: Arc::new(AlertHub::new(thresholds)),
            source,
            sessions: Arc::new(AlertSessionRegistry::new()),
            preferences,
            notifier,
            loyalty_stats: Arc::new(LoyaltyStatsStore::new()),
        })
    }

    pub fn with_source(mut self, source: Arc<dyn AlertSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_preferences(mut self, preferences: PreferencesStore) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn AlertNotifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.server.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let alert_routes = Router::new()
        .route(
            "/api/v1/subscription-alerts",
            get(subscription_alerts::list_alerts),
        )
        .route(
            "/api/v1/subscription-alerts/summary",
            get(subscription_alerts::alert_summary),
        )
        .route(
            "/api/v1/subscription-alerts/refresh",
            post(subscription_alerts::refresh_alerts),
        )
        .route(
            "/api/v1/alert-sessions",
            post(alert_sessions::create_session),
        )
        .route(
            "/api/v1/alert-sessions/:session_id",
            get(alert_sessions::poll_session).delete(alert_sessions::delete_session),
        )
        .route(
            "/api/v1/alert-sessions/:session_id/reset",
            post(alert_sessions::reset_session),
        )
        .route(
            "/api/v1/alert-sessions/:session_id/permission",
            put(alert_sessions::update_permission),
        )
        .route(
            "/api/v1/alert-preferences/:owner_id",
            get(alert_preferences::get_preferences).put(alert_preferences::update_preferences),
        );

    let member_routes = Router::new()
        .route("/api/v1/members", post(members::create_member))
        .route("/api/v1/members/:user_id", get(members::get_member))
        .route(
            "/api/v1/members/:user_id/subscription",
            put(members::update_subscription),
        )
        .route(
            "/api/v1/members/:user_id/loyalty",
            get(loyalty::get_stats).post(loyalty::append_entry),
        )
        .route(
            "/api/v1/members/:user_id/loyalty/history",
            get(loyalty::get_history),
        )
        .route(
            "/api/v1/members/:user_id/loyalty/verify",
            get(loyalty::verify_ledger),
        );

    let reward_routes = Router::new()
        .route(
            "/api/v1/rewards",
            get(rewards::list_rewards).post(rewards::create_reward),
        )
        .route(
            "/api/v1/rewards/:reward_id",
            get(rewards::get_reward).patch(rewards::update_reward),
        )
        .route(
            "/api/v1/rewards/:reward_id/redeem",
            post(rewards::redeem_reward),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(alert_routes)
        .merge(member_routes)
        .merge(reward_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
