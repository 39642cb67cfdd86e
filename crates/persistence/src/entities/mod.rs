//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod alert_preference;
pub mod loyalty_points;
pub mod member;
pub mod reward;

pub use alert_preference::AlertPreferenceEntity;
pub use loyalty_points::{LoyaltyPointsEntity, LoyaltyStatsEntity, LoyaltyTransactionTypeDb};
pub use member::{MemberEntity, MembershipLevelDb};
pub use reward::{RewardCategoryDb, RewardEntity};
