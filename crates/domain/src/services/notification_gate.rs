//! Sound/notification dedup gate.
//!
//! One gate per mounted consumer. The gate lets side effects through once
//! (`Idle -> Alerted`) and then stays closed while the same alert condition
//! persists across polls, until the consumer explicitly resets it.

use crate::models::{
    AlertPreferences, GateDecision, GateState, NotificationPermission, SubscriptionAlert,
};

#[derive(Debug, Clone, Default)]
pub struct NotificationGate {
    state: GateState,
    fire_count: u32,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Number of times this gate has let side effects through.
    pub fn fire_count(&self) -> u32 {
        self.fire_count
    }

    /// Evaluates one poll result.
    ///
    /// - sound plays if there is at least one alert and sound is enabled;
    /// - one notification per critical alert, only when notifications are
    ///   enabled and permission was granted;
    /// - once anything fires the gate is `Alerted` and returns nothing until
    ///   [`reset`](Self::reset).
    pub fn evaluate(
        &mut self,
        alerts: &[SubscriptionAlert],
        prefs: &AlertPreferences,
        permission: NotificationPermission,
    ) -> GateDecision {
        if self.state == GateState::Alerted || alerts.is_empty() {
            return GateDecision::none();
        }

        let play_sound = prefs.sound_enabled;
        let notifications = if prefs.notification_enabled
            && permission == NotificationPermission::Granted
        {
            alerts.iter().filter(|a| a.is_critical()).cloned().collect()
        } else {
            Vec::new()
        };

        let decision = GateDecision {
            play_sound,
            notifications,
        };

        if decision.fired() {
            self.state = GateState::Alerted;
            self.fire_count += 1;
        }

        decision
    }

    /// Reopens the gate (tab change or explicit user reset).
    pub fn reset(&mut self) {
        self.state = GateState::Idle;
    }
}
