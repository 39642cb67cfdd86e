//! Alert preference repository: a per-owner string key-value table.

use std::collections::HashMap;

use async_trait::async_trait;
use domain::services::{KeyValueStore, StoreError};
use sqlx::PgPool;

use crate::entities::AlertPreferenceEntity;
use crate::metrics::QueryTimer;

/// Repository for alert preference rows.
#[derive(Clone)]
pub struct AlertPreferenceRepository {
    pool: PgPool,
}

impl AlertPreferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All stored keys for an owner.
    pub async fn find_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<AlertPreferenceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_alert_preferences");
        let result = sqlx::query_as::<_, AlertPreferenceEntity>(
            r#"
            SELECT owner_id, key, value, updated_at
            FROM alert_preferences
            WHERE owner_id = $1
            ORDER BY key
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upsert several keys atomically.
    pub async fn upsert_many(
        &self,
        owner_id: &str,
        entries: &[(&str, String)],
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_alert_preferences");
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO alert_preferences (owner_id, key, value)
                VALUES ($1, $2, $3)
                ON CONFLICT (owner_id, key)
                DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                "#,
            )
            .bind(owner_id)
            .bind(*key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for AlertPreferenceRepository {
    async fn get_all(&self, owner_id: &str) -> Result<HashMap<String, String>, StoreError> {
        let rows = self
            .find_by_owner(owner_id)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    async fn set_many(&self, owner_id: &str, entries: &[(&str, String)]) -> Result<(), StoreError> {
        self.upsert_many(owner_id, entries)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
