//! Alert preference storage.
//!
//! Preferences are kept as plain strings in a key-value backend, one row per
//! `(owner, key)`. The backend is a trait so the service can run against
//! PostgreSQL in production and an in-memory map in tests.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{AlertPreferences, UpdateAlertPreferencesRequest};

/// Error raised by a key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Preference backend error: {0}")]
    Backend(String),
}

/// String key-value storage scoped by owner.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// All stored values for an owner.
    async fn get_all(&self, owner_id: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Writes several values for an owner at once.
    async fn set_many(&self, owner_id: &str, entries: &[(&str, String)]) -> Result<(), StoreError>;
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_all(&self, owner_id: &str) -> Result<HashMap<String, String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(owner_id).cloned().unwrap_or_default())
    }

    async fn set_many(&self, owner_id: &str, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut all = self.entries.write().await;
        let owner = all.entry(owner_id.to_string()).or_default();
        for (key, value) in entries {
            owner.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

/// Reads and writes [`AlertPreferences`] through a [`KeyValueStore`].
#[derive(Clone)]
pub struct PreferencesStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PreferencesStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by process memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()))
    }

    /// Loads an owner's preferences; absent values fall back to defaults.
    pub async fn load(&self, owner_id: &str) -> Result<AlertPreferences, StoreError> {
        let stored = self.backend.get_all(owner_id).await?;
        Ok(AlertPreferences::from_lookup(|key| stored.get(key).cloned()))
    }

    /// Persists all four values.
    pub async fn save(&self, owner_id: &str, prefs: &AlertPreferences) -> Result<(), StoreError> {
        let entries = prefs.to_entries();
        self.backend.set_many(owner_id, &entries).await?;
        tracing::debug!(
            owner_id = %owner_id,
            sound_enabled = prefs.sound_enabled,
            notification_enabled = prefs.notification_enabled,
            alert_threshold_days = prefs.alert_threshold_days,
            reminder_threshold_days = prefs.reminder_threshold_days,
            "Alert preferences saved"
        );
        Ok(())
    }

    /// Applies a partial update and persists the result.
    pub async fn update(
        &self,
        owner_id: &str,
        update: &UpdateAlertPreferencesRequest,
    ) -> Result<AlertPreferences, StoreError> {
        let mut prefs = self.load(owner_id).await?;
        prefs.apply(update);
        self.save(owner_id, &prefs).await?;
        Ok(prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert_preferences::{ALERT_THRESHOLD_DAYS_KEY, SOUND_ENABLED_KEY};

    #[tokio::test]
    async fn test_load_defaults_for_unknown_owner() {
        let store = PreferencesStore::in_memory();
        let prefs = store.load("nobody").await.unwrap();
        assert_eq!(prefs, AlertPreferences::default());
    }

    #[tokio::test]
    async fn test_save_and_reload_roundtrip() {
        let store = PreferencesStore::in_memory();
        let prefs = AlertPreferences {
            sound_enabled: false,
            notification_enabled: false,
            alert_threshold_days: 30,
            reminder_threshold_days: 7,
        };
        store.save("front-desk", &prefs).await.unwrap();
        assert_eq!(store.load("front-desk").await.unwrap(), prefs);
    }

    #[tokio::test]
    async fn test_out_of_range_thresholds_survive_reload() {
        let store = PreferencesStore::in_memory();
        let prefs = AlertPreferences {
            sound_enabled: false,
            notification_enabled: true,
            alert_threshold_days: 45,
            reminder_threshold_days: 10,
        };
        store.save("front-desk", &prefs).await.unwrap();
        assert_eq!(store.load("front-desk").await.unwrap(), prefs);
    }

    #[tokio::test]
    async fn test_values_stored_as_strings() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = PreferencesStore::new(backend.clone());
        store
            .save("owner", &AlertPreferences::default())
            .await
            .unwrap();

        let raw = backend.get_all("owner").await.unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(raw[SOUND_ENABLED_KEY], "true");
        assert_eq!(raw[ALERT_THRESHOLD_DAYS_KEY], "3");
    }

    #[tokio::test]
    async fn test_update_is_partial_and_isolated_per_owner() {
        let store = PreferencesStore::in_memory();
        let updated = store
            .update(
                "manager",
                &UpdateAlertPreferencesRequest {
                    reminder_threshold_days: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.reminder_threshold_days, 4);
        assert_eq!(updated.alert_threshold_days, 3);

        let other = store.load("accountant").await.unwrap();
        assert_eq!(other, AlertPreferences::default());
    }
}
