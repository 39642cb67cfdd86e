use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

use shared::validation::{
    validate_alert_threshold_days, validate_reminder_threshold_days, MAX_ALERT_THRESHOLD_DAYS,
    MAX_REMINDER_THRESHOLD_DAYS,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Seconds to wait for background jobs on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Where the poller reads subscription records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSourceKind {
    /// The members table of this service's database.
    Database,
    /// An external endpoint returning a JSON array of subscription records.
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    /// Seconds between two polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_alert_source")]
    pub source: AlertSourceKind,

    /// Required when `source = "http"`.
    #[serde(default)]
    pub source_url: String,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Alerts whose nearest triggering date is at most this many days away
    /// are critical.
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold_days: i64,

    /// Service-wide expiry threshold used for the published snapshot.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold_days: i32,

    /// Service-wide reminder threshold used for the published snapshot.
    #[serde(default = "default_reminder_threshold")]
    pub reminder_threshold_days: i32,

    /// How far ahead the database source looks. Must cover the largest
    /// threshold a consumer may choose.
    #[serde(default = "default_candidate_window")]
    pub candidate_window_days: i64,

    /// Sessions not polled for this long are dropped.
    #[serde(default = "default_session_idle_timeout")]
    pub session_idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Deliver fired notifications to `webhook_url` instead of the log.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub webhook_url: String,

    #[serde(default = "default_notifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: String::new(),
            timeout_secs: default_notifier_timeout(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_shutdown_timeout() -> u64 {
    10
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_poll_interval() -> u64 {
    30
}
fn default_alert_source() -> AlertSourceKind {
    AlertSourceKind::Database
}
fn default_fetch_timeout() -> u64 {
    10
}
fn default_critical_threshold() -> i64 {
    domain::services::DEFAULT_CRITICAL_THRESHOLD_DAYS
}
fn default_alert_threshold() -> i32 {
    3
}
fn default_reminder_threshold() -> i32 {
    1
}
fn default_candidate_window() -> i64 {
    31
}
fn default_session_idle_timeout() -> u64 {
    900
}
fn default_notifier_timeout() -> u64 {
    10
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with GYM__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("GYM").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Build a configuration from embedded defaults plus overrides, without
    /// touching the filesystem. Validation is skipped.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30
            cors_origins = []

            [database]
            url = ""
            max_connections = 5
            min_connections = 0
            connect_timeout_secs = 1
            idle_timeout_secs = 600

            [logging]
            level = "debug"
            format = "pretty"

            [alerts]
            poll_interval_secs = 30
            source = "database"
            fetch_timeout_secs = 5
            critical_threshold_days = 2
            alert_threshold_days = 3
            reminder_threshold_days = 1
            candidate_window_days = 31

            [notifier]
            enabled = false
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "GYM__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.alerts.poll_interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "alerts.poll_interval_secs must be at least 1".to_string(),
            ));
        }

        if self.alerts.source == AlertSourceKind::Http && self.alerts.source_url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "alerts.source_url is required when alerts.source = \"http\"".to_string(),
            ));
        }

        validate_alert_threshold_days(self.alerts.alert_threshold_days).map_err(|_| {
            ConfigValidationError::InvalidValue(
                "alerts.alert_threshold_days must be between 1 and 30".to_string(),
            )
        })?;
        validate_reminder_threshold_days(self.alerts.reminder_threshold_days).map_err(|_| {
            ConfigValidationError::InvalidValue(
                "alerts.reminder_threshold_days must be between 1 and 7".to_string(),
            )
        })?;

        if self.alerts.critical_threshold_days < 0 {
            return Err(ConfigValidationError::InvalidValue(
                "alerts.critical_threshold_days cannot be negative".to_string(),
            ));
        }

        // Owners can widen their thresholds up to the maximum, and per-owner
        // snapshots only re-classify the candidates fetched here.
        let widest_threshold = MAX_ALERT_THRESHOLD_DAYS.max(MAX_REMINDER_THRESHOLD_DAYS);
        if self.alerts.candidate_window_days < i64::from(widest_threshold) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "alerts.candidate_window_days must be at least {}",
                widest_threshold
            )));
        }

        if self.notifier.enabled && self.notifier.webhook_url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "notifier.webhook_url is required when the notifier is enabled".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
