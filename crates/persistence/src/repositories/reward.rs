//! Reward catalog repository, including atomic redemption.

use chrono::{DateTime, Utc};
use domain::models::{
    CreateRewardRequest, LoyaltyTransactionType, NewLoyaltyEntry, RedeemableReward,
    RewardCategory, UpdateRewardRequest,
};
use domain::services::{check_redemption, next_balance, RedemptionContext};
use shared::validation::UNLIMITED_STOCK;
use sqlx::PgPool;
use uuid::Uuid;

use super::loyalty::{current_balance, insert_entry, lock_member};
use crate::entities::{LoyaltyPointsEntity, MembershipLevelDb, RewardCategoryDb, RewardEntity};
use crate::error::RepositoryError;
use crate::metrics::QueryTimer;

const REWARD_COLUMNS: &str = "id, name, description, points_required, category, is_active, \
     stock, valid_until, min_membership_level, max_redemptions_per_user, total_redemptions, \
     created_at, updated_at";

/// Result of a committed redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub entry: LoyaltyPointsEntity,
    pub reward: RewardEntity,
}

/// Repository for the redeemable_rewards table.
#[derive(Clone)]
pub struct RewardRepository {
    pool: PgPool,
}

impl RewardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a reward.
    pub async fn create(&self, request: &CreateRewardRequest) -> Result<RewardEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_reward");
        let category: RewardCategoryDb = request.category.into();
        let level: MembershipLevelDb = request.min_membership_level.into();
        let result = sqlx::query_as::<_, RewardEntity>(&format!(
            r#"
            INSERT INTO redeemable_rewards (
                name, description, points_required, category, is_active, stock,
                valid_until, min_membership_level, max_redemptions_per_user
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {REWARD_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.points_required)
        .bind(category)
        .bind(request.is_active)
        .bind(request.stock)
        .bind(request.valid_until)
        .bind(level)
        .bind(request.max_redemptions_per_user)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a reward by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RewardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_reward_by_id");
        let result = sqlx::query_as::<_, RewardEntity>(&format!(
            "SELECT {REWARD_COLUMNS} FROM redeemable_rewards WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List rewards, optionally filtered by category and current availability.
    pub async fn list(
        &self,
        category: Option<RewardCategory>,
        available_only: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<RewardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_rewards");
        let category: Option<RewardCategoryDb> = category.map(Into::into);
        let result = sqlx::query_as::<_, RewardEntity>(&format!(
            r#"
            SELECT {REWARD_COLUMNS}
            FROM redeemable_rewards
            WHERE ($1::reward_category IS NULL OR category = $1)
              AND (
                  $2 = false
                  OR (is_active = true AND stock <> 0 AND (valid_until IS NULL OR valid_until > $3))
              )
            ORDER BY points_required, name
            "#
        ))
        .bind(category)
        .bind(available_only)
        .bind(now)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Partially update a reward.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateRewardRequest,
    ) -> Result<Option<RewardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_reward");
        let category: Option<RewardCategoryDb> = request.category.map(Into::into);
        let level: Option<MembershipLevelDb> = request.min_membership_level.map(Into::into);
        let result = sqlx::query_as::<_, RewardEntity>(&format!(
            r#"
            UPDATE redeemable_rewards SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                points_required = COALESCE($4, points_required),
                category = COALESCE($5, category),
                is_active = COALESCE($6, is_active),
                stock = COALESCE($7, stock),
                valid_until = COALESCE($8, valid_until),
                min_membership_level = COALESCE($9, min_membership_level),
                max_redemptions_per_user = COALESCE($10, max_redemptions_per_user),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REWARD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.points_required)
        .bind(category)
        .bind(request.is_active)
        .bind(request.stock)
        .bind(request.valid_until)
        .bind(level)
        .bind(request.max_redemptions_per_user)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Redeem a reward for a member in one transaction.
    ///
    /// Locks the reward and the member, checks every redemption rule, writes
    /// a `redeemed` ledger entry for `-points_required` and consumes one unit
    /// of stock unless stock is unlimited.
    pub async fn redeem(
        &self,
        reward_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Redemption, RepositoryError> {
        let timer = QueryTimer::new("redeem_reward");
        let mut tx = self.pool.begin().await?;

        let reward_row = sqlx::query_as::<_, RewardEntity>(&format!(
            "SELECT {REWARD_COLUMNS} FROM redeemable_rewards WHERE id = $1 FOR UPDATE"
        ))
        .bind(reward_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound("Reward"))?;

        let level = lock_member(&mut *tx, user_id)
            .await?
            .ok_or(RepositoryError::NotFound("Member"))?;

        let balance = current_balance(&mut *tx, user_id).await?;
        let previous_redemptions = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM loyalty_points_history
            WHERE user_id = $1 AND reward_id = $2 AND transaction_type = 'redeemed'
            "#,
        )
        .bind(user_id)
        .bind(reward_id)
        .fetch_one(&mut *tx)
        .await?;

        let reward: RedeemableReward = reward_row.into();
        let ctx = RedemptionContext {
            membership_level: level.into(),
            balance,
            previous_redemptions,
            now,
        };
        check_redemption(&reward, &ctx)?;

        let entry = NewLoyaltyEntry {
            user_id,
            points: -reward.points_required,
            transaction_type: LoyaltyTransactionType::Redeemed,
            reason: format!("Redeemed {}", reward.name),
            reward_id: Some(reward_id),
            payment_id: None,
            attendance_id: None,
            admin_id: None,
        };
        let remaining = next_balance(balance, entry.points)?;
        let inserted = insert_entry(&mut *tx, &entry, remaining).await?;

        let updated = sqlx::query_as::<_, RewardEntity>(&format!(
            r#"
            UPDATE redeemable_rewards SET
                stock = CASE WHEN stock = $2 THEN stock ELSE stock - 1 END,
                total_redemptions = total_redemptions + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REWARD_COLUMNS}
            "#
        ))
        .bind(reward_id)
        .bind(UNLIMITED_STOCK)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();

        tracing::info!(
            reward_id = %reward_id,
            user_id = %user_id,
            points = reward.points_required,
            remaining_points = remaining,
            "Reward redeemed"
        );

        Ok(Redemption {
            entry: inserted,
            reward: updated,
        })
    }
}
