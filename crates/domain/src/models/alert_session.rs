//! Alert consumer session model.
//!
//! A session is one mounted alert consumer (a dashboard badge or indicator
//! panel). Each session owns a notification gate so that sound and
//! notifications fire at most once per mount.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::alert_preferences::AlertPreferences;
use super::subscription_alert::{AlertSnapshot, SubscriptionAlert};

/// Browser notification permission as reported by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// The user has not been asked yet.
    #[default]
    Default,
}

impl std::fmt::Display for NotificationPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationPermission::Granted => write!(f, "granted"),
            NotificationPermission::Denied => write!(f, "denied"),
            NotificationPermission::Default => write!(f, "default"),
        }
    }
}

/// Dedup gate state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    #[default]
    Idle,
    Alerted,
}

/// Request payload for mounting a consumer.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertSessionRequest {
    /// Preference owner (browser profile or staff account).
    #[validate(length(min = 1, max = 128, message = "Owner id must be 1-128 characters"))]
    pub owner_id: String,

    #[serde(default)]
    pub permission: NotificationPermission,
}

/// Request payload for reporting a permission change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    pub permission: NotificationPermission,
}

/// Response payload describing a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSessionResponse {
    pub session_id: Uuid,
    pub owner_id: String,
    pub permission: NotificationPermission,
    pub gate_state: GateState,
    pub preferences: AlertPreferences,
    pub created_at: DateTime<Utc>,
}

/// Side effects the client should perform after a poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    pub play_sound: bool,
    pub notifications: Vec<SubscriptionAlert>,
}

impl GateDecision {
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether anything fired.
    pub fn fired(&self) -> bool {
        self.play_sound || !self.notifications.is_empty()
    }
}

/// Response payload for a session poll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPollResponse {
    pub session_id: Uuid,
    pub snapshot: AlertSnapshot,
    pub decision: GateDecision,
    pub gate_state: GateState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_default_is_default() {
        let json = r#"{"ownerId": "front-desk"}"#;
        let request: CreateAlertSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.permission, NotificationPermission::Default);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_empty_owner_rejected() {
        let json = r#"{"ownerId": "", "permission": "granted"}"#;
        let request: CreateAlertSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.permission, NotificationPermission::Granted);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_gate_decision_fired() {
        assert!(!GateDecision::none().fired());
        let decision = GateDecision {
            play_sound: true,
            notifications: vec![],
        };
        assert!(decision.fired());
    }

    #[test]
    fn test_display() {
        assert_eq!(NotificationPermission::Denied.to_string(), "denied");
        assert_eq!(
            serde_json::to_string(&GateState::Alerted).unwrap(),
            "\"alerted\""
        );
    }
}
