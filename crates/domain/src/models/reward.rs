//! Redeemable reward catalog domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::UNLIMITED_STOCK;
use uuid::Uuid;
use validator::Validate;

use super::loyalty::LoyaltyPointsEntry;
use super::member::MembershipLevel;

/// Reward catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardCategory {
    Merchandise,
    Service,
    Discount,
    Supplement,
    Other,
}

impl std::fmt::Display for RewardCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewardCategory::Merchandise => write!(f, "merchandise"),
            RewardCategory::Service => write!(f, "service"),
            RewardCategory::Discount => write!(f, "discount"),
            RewardCategory::Supplement => write!(f, "supplement"),
            RewardCategory::Other => write!(f, "other"),
        }
    }
}

/// A reward members can buy with loyalty points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemableReward {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub points_required: i32,
    pub category: RewardCategory,
    pub is_active: bool,
    /// Remaining stock; -1 means unlimited.
    pub stock: i32,
    pub valid_until: Option<DateTime<Utc>>,
    pub min_membership_level: MembershipLevel,
    pub max_redemptions_per_user: Option<i32>,
    pub total_redemptions: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RedeemableReward {
    pub fn has_unlimited_stock(&self) -> bool {
        self.stock == UNLIMITED_STOCK
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| until <= now)
    }

    /// Active, not expired, and not out of stock.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now) && self.stock != 0
    }
}

/// Request payload for creating a reward.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 1000000, message = "Points required must be between 1 and 1000000"))]
    pub points_required: i32,

    pub category: RewardCategory,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default = "default_stock")]
    pub stock: i32,

    pub valid_until: Option<DateTime<Utc>>,

    #[serde(default)]
    pub min_membership_level: MembershipLevel,

    #[validate(range(min = 1, message = "Max redemptions per user must be at least 1"))]
    pub max_redemptions_per_user: Option<i32>,
}

fn default_active() -> bool {
    true
}

fn default_stock() -> i32 {
    UNLIMITED_STOCK
}

/// Request payload for updating a reward (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRewardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 1000000, message = "Points required must be between 1 and 1000000"))]
    pub points_required: Option<i32>,

    pub category: Option<RewardCategory>,

    pub is_active: Option<bool>,

    pub stock: Option<i32>,

    pub valid_until: Option<DateTime<Utc>>,

    pub min_membership_level: Option<MembershipLevel>,

    #[validate(range(min = 1, message = "Max redemptions per user must be at least 1"))]
    pub max_redemptions_per_user: Option<i32>,
}

/// Query parameters for listing rewards.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRewardsQuery {
    /// Only rewards that can be redeemed right now (default: false)
    #[serde(default)]
    pub available_only: bool,
    pub category: Option<RewardCategory>,
}

/// Response payload for reward operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardResponse {
    #[serde(flatten)]
    pub reward: RedeemableReward,
    pub available: bool,
}

impl RewardResponse {
    pub fn at(reward: RedeemableReward, now: DateTime<Utc>) -> Self {
        let available = reward.is_available(now);
        Self { reward, available }
    }
}

/// Response for listing rewards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRewardsResponse {
    pub rewards: Vec<RewardResponse>,
    pub total: usize,
}

/// Request payload for redeeming a reward.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRewardRequest {
    pub user_id: Uuid,
}

/// Result of a successful redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRewardResponse {
    pub entry: LoyaltyPointsEntry,
    pub reward: RewardResponse,
}
