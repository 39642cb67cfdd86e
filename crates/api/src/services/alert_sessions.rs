//! Registry of mounted alert consumers.
//!
//! Each session owns a [`NotificationGate`]; creating a session is the
//! mount and removing it is the unmount.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domain::models::{
    AlertPreferences, GateDecision, GateState, NotificationPermission, SubscriptionAlert,
};
use domain::services::NotificationGate;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Public view of a session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: Uuid,
    pub owner_id: String,
    pub permission: NotificationPermission,
    pub gate_state: GateState,
    pub fire_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

struct AlertSession {
    owner_id: String,
    permission: NotificationPermission,
    gate: NotificationGate,
    created_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
}

impl AlertSession {
    fn info(&self, id: Uuid) -> SessionInfo {
        SessionInfo {
            id,
            owner_id: self.owner_id.clone(),
            permission: self.permission,
            gate_state: self.gate.state(),
            fire_count: self.gate.fire_count(),
            created_at: self.created_at,
            last_seen_at: self.last_seen_at,
        }
    }
}

#[derive(Default)]
pub struct AlertSessionRegistry {
    sessions: RwLock<HashMap<Uuid, AlertSession>>,
}

impl AlertSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, owner_id: &str, permission: NotificationPermission) -> SessionInfo {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let session = AlertSession {
            owner_id: owner_id.to_string(),
            permission,
            gate: NotificationGate::new(),
            created_at: now,
            last_seen_at: now,
        };
        let info = session.info(id);
        self.sessions.write().await.insert(id, session);
        info
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionInfo> {
        self.sessions.read().await.get(&id).map(|s| s.info(id))
    }

    /// Unmount. Returns false when the session did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Reopens the session's gate.
    pub async fn reset(&self, id: Uuid) -> Option<SessionInfo> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.gate.reset();
        session.last_seen_at = Utc::now();
        Some(session.info(id))
    }

    pub async fn set_permission(
        &self,
        id: Uuid,
        permission: NotificationPermission,
    ) -> Option<SessionInfo> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.permission = permission;
        session.last_seen_at = Utc::now();
        Some(session.info(id))
    }

    /// Runs the session's gate over one poll result.
    pub async fn evaluate(
        &self,
        id: Uuid,
        alerts: &[SubscriptionAlert],
        prefs: &AlertPreferences,
    ) -> Option<(GateDecision, SessionInfo)> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        let decision = session.gate.evaluate(alerts, prefs, session.permission);
        session.last_seen_at = Utc::now();
        Some((decision, session.info(id)))
    }

    /// Drops sessions not seen since `cutoff`. Returns how many were removed.
    pub async fn remove_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen_at >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
