use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use gym_alerts_api::app::{create_app, AppState};
use gym_alerts_api::config::Config;
use gym_alerts_api::jobs::{JobScheduler, SessionReaperJob, SubscriptionAlertPollJob};
use gym_alerts_api::middleware::{init_metrics, logging::init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging);

    info!("Starting Gym Alerts API v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = init_metrics() {
        warn!(error = %e, "Prometheus recorder not installed, /metrics disabled");
    }

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let addr = config.socket_addr()?;
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let poll_interval = config.alerts.poll_interval_secs;
    let idle_timeout = config.alerts.session_idle_timeout_secs;

    let state = AppState::new(config, pool)?;

    let mut scheduler = JobScheduler::new();
    scheduler.register(SubscriptionAlertPollJob::new(
        Arc::clone(&state.hub),
        Arc::clone(&state.source),
        poll_interval,
    ));
    scheduler.register(SessionReaperJob::new(
        Arc::clone(&state.sessions),
        idle_timeout,
    ));
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(shutdown_timeout).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}
