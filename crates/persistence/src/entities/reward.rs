//! Redeemable reward entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{RedeemableReward, RewardCategory};
use sqlx::FromRow;
use uuid::Uuid;

use super::member::MembershipLevelDb;

/// Database enum for reward_category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "reward_category", rename_all = "lowercase")]
pub enum RewardCategoryDb {
    Merchandise,
    Service,
    Discount,
    Supplement,
    Other,
}

impl From<RewardCategoryDb> for RewardCategory {
    fn from(db: RewardCategoryDb) -> Self {
        match db {
            RewardCategoryDb::Merchandise => RewardCategory::Merchandise,
            RewardCategoryDb::Service => RewardCategory::Service,
            RewardCategoryDb::Discount => RewardCategory::Discount,
            RewardCategoryDb::Supplement => RewardCategory::Supplement,
            RewardCategoryDb::Other => RewardCategory::Other,
        }
    }
}

impl From<RewardCategory> for RewardCategoryDb {
    fn from(c: RewardCategory) -> Self {
        match c {
            RewardCategory::Merchandise => RewardCategoryDb::Merchandise,
            RewardCategory::Service => RewardCategoryDb::Service,
            RewardCategory::Discount => RewardCategoryDb::Discount,
            RewardCategory::Supplement => RewardCategoryDb::Supplement,
            RewardCategory::Other => RewardCategoryDb::Other,
        }
    }
}

/// Database row mapping for the redeemable_rewards table.
#[derive(Debug, Clone, FromRow)]
pub struct RewardEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub points_required: i32,
    pub category: RewardCategoryDb,
    pub is_active: bool,
    pub stock: i32,
    pub valid_until: Option<DateTime<Utc>>,
    pub min_membership_level: MembershipLevelDb,
    pub max_redemptions_per_user: Option<i32>,
    pub total_redemptions: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RewardEntity> for RedeemableReward {
    fn from(entity: RewardEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            points_required: entity.points_required,
            category: entity.category.into(),
            is_active: entity.is_active,
            stock: entity.stock,
            valid_until: entity.valid_until,
            min_membership_level: entity.min_membership_level.into(),
            max_redemptions_per_user: entity.max_redemptions_per_user,
            total_redemptions: entity.total_redemptions,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
