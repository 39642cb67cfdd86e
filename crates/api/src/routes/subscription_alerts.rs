//! Subscription alert endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{AlertPreferences, AlertSnapshot, AlertSummary};
use serde::Deserialize;
use shared::validation::{validate_alert_threshold_days, validate_reminder_threshold_days};

use crate::app::AppState;
use crate::error::ApiError;

/// Optional per-request thresholds. Without them the published snapshot is
/// returned as is.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub alert_threshold_days: Option<i32>,
    pub reminder_threshold_days: Option<i32>,
}

impl AlertQuery {
    fn preferences(&self) -> Result<Option<AlertPreferences>, ApiError> {
        if self.alert_threshold_days.is_none() && self.reminder_threshold_days.is_none() {
            return Ok(None);
        }

        let defaults = AlertPreferences::default();
        let alert_threshold_days = self
            .alert_threshold_days
            .unwrap_or(defaults.alert_threshold_days);
        let reminder_threshold_days = self
            .reminder_threshold_days
            .unwrap_or(defaults.reminder_threshold_days);
        validate_alert_threshold_days(alert_threshold_days)?;
        validate_reminder_threshold_days(reminder_threshold_days)?;

        Ok(Some(AlertPreferences {
            alert_threshold_days,
            reminder_threshold_days,
            ..defaults
        }))
    }
}

fn snapshot_for_query(state: &AppState, query: &AlertQuery) -> Result<AlertSnapshot, ApiError> {
    Ok(match query.preferences()? {
        Some(prefs) => state.hub.snapshot_for(&prefs),
        None => (*state.hub.current().snapshot).clone(),
    })
}

/// Latest alert snapshot.
///
/// GET /api/v1/subscription-alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<AlertSnapshot>, ApiError> {
    Ok(Json(snapshot_for_query(&state, &query)?))
}

/// Badge counters.
///
/// GET /api/v1/subscription-alerts/summary
pub async fn alert_summary(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<AlertSummary>, ApiError> {
    Ok(Json(snapshot_for_query(&state, &query)?.summary()))
}

/// Run one poll now instead of waiting for the next tick.
///
/// POST /api/v1/subscription-alerts/refresh
pub async fn refresh_alerts(
    State(state): State<AppState>,
) -> Result<Json<AlertSnapshot>, ApiError> {
    let snapshot = state.hub.refresh(state.source.as_ref()).await?;
    Ok(Json((*snapshot).clone()))
}
