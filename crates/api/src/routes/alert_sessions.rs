//! Alert consumer session handlers.
//!
//! A dashboard component mounts by creating a session and polls it. Each
//! poll returns the snapshot classified with the owner's thresholds plus the
//! gate's decision on sound and notifications.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::alert_session::{
    AlertPollResponse, AlertSessionResponse, CreateAlertSessionRequest, UpdatePermissionRequest,
};
use domain::services::{AlertNotificationPayload, NotificationResult};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_gate_fired;
use crate::services::SessionInfo;

fn session_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Alert session {} not found", id))
}

async fn session_response(
    state: &AppState,
    info: SessionInfo,
) -> Result<AlertSessionResponse, ApiError> {
    let preferences = state.preferences.load(&info.owner_id).await?;
    Ok(AlertSessionResponse {
        session_id: info.id,
        owner_id: info.owner_id,
        permission: info.permission,
        gate_state: info.gate_state,
        preferences,
        created_at: info.created_at,
    })
}

/// Mount a consumer.
///
/// POST /api/v1/alert-sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateAlertSessionRequest>,
) -> Result<(StatusCode, Json<AlertSessionResponse>), ApiError> {
    request.validate()?;

    let info = state
        .sessions
        .create(&request.owner_id, request.permission)
        .await;

    info!(
        session_id = %info.id,
        owner_id = %info.owner_id,
        permission = %info.permission,
        "Alert session created"
    );

    Ok((StatusCode::CREATED, Json(session_response(&state, info).await?)))
}

/// Poll a session.
///
/// GET /api/v1/alert-sessions/:session_id
pub async fn poll_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AlertPollResponse>, ApiError> {
    let info = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    let prefs = state.preferences.load(&info.owner_id).await?;
    let snapshot = state.hub.snapshot_for(&prefs);

    let (decision, info) = state
        .sessions
        .evaluate(session_id, &snapshot.alerts, &prefs)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    if decision.fired() {
        record_gate_fired(decision.play_sound, decision.notifications.len());
        info!(
            session_id = %session_id,
            play_sound = decision.play_sound,
            notifications = decision.notifications.len(),
            "Alert gate fired"
        );
        dispatch_notifications(&state, &info.owner_id, &decision.notifications);
    }

    Ok(Json(AlertPollResponse {
        session_id,
        snapshot,
        decision,
        gate_state: info.gate_state,
    }))
}

/// Hands fired notifications to the configured notifier without blocking
/// the poll.
fn dispatch_notifications(
    state: &AppState,
    owner_id: &str,
    alerts: &[domain::models::SubscriptionAlert],
) {
    if alerts.is_empty() {
        return;
    }

    let now = Utc::now();
    let payloads: Vec<AlertNotificationPayload> = alerts
        .iter()
        .map(|alert| AlertNotificationPayload::from_alert(owner_id, alert, now))
        .collect();
    let notifier = state.notifier.clone();

    tokio::spawn(async move {
        for payload in payloads {
            let user_id = payload.user_id.clone();
            match notifier.notify(payload).await {
                NotificationResult::Sent => debug!(user_id = %user_id, "Notification sent"),
                NotificationResult::Skipped => debug!(user_id = %user_id, "Notification skipped"),
                NotificationResult::Failed(e) => {
                    warn!(user_id = %user_id, error = %e, "Notification failed")
                }
            }
        }
    });
}

/// Reopen the gate (tab change or user dismissal).
///
/// POST /api/v1/alert-sessions/:session_id/reset
pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AlertSessionResponse>, ApiError> {
    let info = state
        .sessions
        .reset(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    debug!(session_id = %session_id, "Alert gate reset");
    Ok(Json(session_response(&state, info).await?))
}

/// Report the browser notification permission.
///
/// PUT /api/v1/alert-sessions/:session_id/permission
pub async fn update_permission(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<UpdatePermissionRequest>,
) -> Result<Json<AlertSessionResponse>, ApiError> {
    let info = state
        .sessions
        .set_permission(session_id, request.permission)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    info!(
        session_id = %session_id,
        permission = %info.permission,
        "Notification permission updated"
    );
    Ok(Json(session_response(&state, info).await?))
}

/// Unmount.
///
/// DELETE /api/v1/alert-sessions/:session_id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.sessions.remove(session_id).await {
        return Err(session_not_found(session_id));
    }

    info!(session_id = %session_id, "Alert session removed");
    Ok(StatusCode::NO_CONTENT)
}
