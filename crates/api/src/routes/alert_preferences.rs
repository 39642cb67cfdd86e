//! Alert preference handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{AlertPreferences, UpdateAlertPreferencesRequest};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/alert-preferences/:owner_id
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Json<AlertPreferences>, ApiError> {
    Ok(Json(state.preferences.load(&owner_id).await?))
}

/// Partial update; absent fields keep their stored value.
///
/// PUT /api/v1/alert-preferences/:owner_id
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    Json(request): Json<UpdateAlertPreferencesRequest>,
) -> Result<Json<AlertPreferences>, ApiError> {
    request.validate()?;

    let prefs = state.preferences.update(&owner_id, &request).await?;

    info!(
        owner_id = %owner_id,
        sound_enabled = prefs.sound_enabled,
        notification_enabled = prefs.notification_enabled,
        alert_threshold_days = prefs.alert_threshold_days,
        reminder_threshold_days = prefs.reminder_threshold_days,
        "Alert preferences updated"
    );

    Ok(Json(prefs))
}
