//! Loyalty ledger repository.
//!
//! Entries are append-only. Appends lock the member row so concurrent
//! writers for the same member serialize and each entry's
//! `remaining_points` is computed from the true previous balance.

use domain::models::NewLoyaltyEntry;
use domain::services::next_balance;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{
    LoyaltyPointsEntity, LoyaltyStatsEntity, LoyaltyTransactionTypeDb, MembershipLevelDb,
};
use crate::error::RepositoryError;
use crate::metrics::QueryTimer;

const ENTRY_COLUMNS: &str = "id, user_id, points, transaction_type, reason, remaining_points, \
     reward_id, payment_id, attendance_id, admin_id, created_at";

/// Repository for the loyalty_points_history table.
#[derive(Clone)]
pub struct LoyaltyRepository {
    pool: PgPool,
}

impl LoyaltyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry, computing its balance from the member's latest one.
    pub async fn append(
        &self,
        entry: &NewLoyaltyEntry,
    ) -> Result<LoyaltyPointsEntity, RepositoryError> {
        let timer = QueryTimer::new("append_loyalty_entry");
        let mut tx = self.pool.begin().await?;

        lock_member(&mut *tx, entry.user_id)
            .await?
            .ok_or(RepositoryError::NotFound("Member"))?;

        let previous = current_balance(&mut *tx, entry.user_id).await?;
        let remaining = next_balance(previous, entry.points)?;
        let inserted = insert_entry(&mut *tx, entry, remaining).await?;

        tx.commit().await?;
        timer.record();

        tracing::debug!(
            user_id = %entry.user_id,
            points = entry.points,
            remaining_points = remaining,
            "Appended loyalty entry"
        );
        Ok(inserted)
    }

    /// One page of a member's history, newest first.
    ///
    /// Ordered by id, the same order that chains `remaining_points`.
    /// `before_id` is the id of the last entry of the previous page. Callers
    /// ask for one extra row to detect a following page.
    pub async fn list_page(
        &self,
        user_id: Uuid,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<LoyaltyPointsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_loyalty_page");
        let result = sqlx::query_as::<_, LoyaltyPointsEntity>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM loyalty_points_history
            WHERE user_id = $1 AND ($2::BIGINT IS NULL OR id < $2)
            ORDER BY id DESC
            LIMIT $3
            "#
        ))
        .bind(user_id)
        .bind(before_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Every entry for a member in insertion order, for auditing.
    pub async fn list_chronological(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<LoyaltyPointsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_loyalty_chronological");
        let result = sqlx::query_as::<_, LoyaltyPointsEntity>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM loyalty_points_history
            WHERE user_id = $1
            ORDER BY id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Aggregate figures for a member. Balance is the latest entry's
    /// `remaining_points`.
    pub async fn stats(&self, user_id: Uuid) -> Result<LoyaltyStatsEntity, sqlx::Error> {
        let timer = QueryTimer::new("loyalty_stats");
        let result = sqlx::query_as::<_, LoyaltyStatsEntity>(
            r#"
            SELECT
                COALESCE((
                    SELECT remaining_points FROM loyalty_points_history
                    WHERE user_id = $1
                    ORDER BY id DESC
                    LIMIT 1
                ), 0) AS balance,
                COALESCE(SUM(points) FILTER (WHERE points > 0), 0)::BIGINT AS total_earned,
                COALESCE(-SUM(points) FILTER (WHERE points < 0), 0)::BIGINT AS total_redeemed,
                COUNT(*) AS entry_count,
                MAX(created_at) AS last_activity_at
            FROM loyalty_points_history
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Locks the member row for the rest of the transaction and returns its
/// membership level.
pub(crate) async fn lock_member(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<MembershipLevelDb>, sqlx::Error> {
    sqlx::query_scalar::<_, MembershipLevelDb>(
        "SELECT membership_level FROM members WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// Latest recorded balance, or zero for an empty ledger.
pub(crate) async fn current_balance(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<i32, sqlx::Error> {
    let balance = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT remaining_points FROM loyalty_points_history
        WHERE user_id = $1
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(balance.unwrap_or(0))
}

pub(crate) async fn insert_entry(
    conn: &mut PgConnection,
    entry: &NewLoyaltyEntry,
    remaining_points: i32,
) -> Result<LoyaltyPointsEntity, sqlx::Error> {
    let transaction_type: LoyaltyTransactionTypeDb = entry.transaction_type.into();
    sqlx::query_as::<_, LoyaltyPointsEntity>(&format!(
        r#"
        INSERT INTO loyalty_points_history (
            user_id, points, transaction_type, reason, remaining_points,
            reward_id, payment_id, attendance_id, admin_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(entry.user_id)
    .bind(entry.points)
    .bind(transaction_type)
    .bind(&entry.reason)
    .bind(remaining_points)
    .bind(entry.reward_id)
    .bind(entry.payment_id)
    .bind(entry.attendance_id)
    .bind(entry.admin_id)
    .fetch_one(conn)
    .await
}
