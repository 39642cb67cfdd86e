//! Loyalty ledger entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{LoyaltyPointsEntry, LoyaltyStats, LoyaltyTransactionType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for loyalty_transaction_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "loyalty_transaction_type", rename_all = "lowercase")]
pub enum LoyaltyTransactionTypeDb {
    Earned,
    Redeemed,
    Bonus,
    Adjustment,
    Expired,
    Refund,
}

impl From<LoyaltyTransactionTypeDb> for LoyaltyTransactionType {
    fn from(db: LoyaltyTransactionTypeDb) -> Self {
        match db {
            LoyaltyTransactionTypeDb::Earned => LoyaltyTransactionType::Earned,
            LoyaltyTransactionTypeDb::Redeemed => LoyaltyTransactionType::Redeemed,
            LoyaltyTransactionTypeDb::Bonus => LoyaltyTransactionType::Bonus,
            LoyaltyTransactionTypeDb::Adjustment => LoyaltyTransactionType::Adjustment,
            LoyaltyTransactionTypeDb::Expired => LoyaltyTransactionType::Expired,
            LoyaltyTransactionTypeDb::Refund => LoyaltyTransactionType::Refund,
        }
    }
}

impl From<LoyaltyTransactionType> for LoyaltyTransactionTypeDb {
    fn from(t: LoyaltyTransactionType) -> Self {
        match t {
            LoyaltyTransactionType::Earned => LoyaltyTransactionTypeDb::Earned,
            LoyaltyTransactionType::Redeemed => LoyaltyTransactionTypeDb::Redeemed,
            LoyaltyTransactionType::Bonus => LoyaltyTransactionTypeDb::Bonus,
            LoyaltyTransactionType::Adjustment => LoyaltyTransactionTypeDb::Adjustment,
            LoyaltyTransactionType::Expired => LoyaltyTransactionTypeDb::Expired,
            LoyaltyTransactionType::Refund => LoyaltyTransactionTypeDb::Refund,
        }
    }
}

/// Database row mapping for the loyalty_points_history table.
#[derive(Debug, Clone, FromRow)]
pub struct LoyaltyPointsEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub points: i32,
    pub transaction_type: LoyaltyTransactionTypeDb,
    pub reason: String,
    pub remaining_points: i32,
    pub reward_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub attendance_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<LoyaltyPointsEntity> for LoyaltyPointsEntry {
    fn from(entity: LoyaltyPointsEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            points: entity.points,
            transaction_type: entity.transaction_type.into(),
            reason: entity.reason,
            remaining_points: entity.remaining_points,
            reward_id: entity.reward_id,
            payment_id: entity.payment_id,
            attendance_id: entity.attendance_id,
            admin_id: entity.admin_id,
            created_at: entity.created_at,
        }
    }
}

/// Aggregate row for a member's ledger.
#[derive(Debug, Clone, FromRow)]
pub struct LoyaltyStatsEntity {
    pub balance: i32,
    pub total_earned: i64,
    pub total_redeemed: i64,
    pub entry_count: i64,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl LoyaltyStatsEntity {
    pub fn into_stats(self, user_id: Uuid) -> LoyaltyStats {
        LoyaltyStats {
            user_id,
            balance: self.balance,
            total_earned: self.total_earned,
            total_redeemed: self.total_redeemed,
            entry_count: self.entry_count,
            last_activity_at: self.last_activity_at,
        }
    }
}
