//! Reward redemption eligibility.

use chrono::{DateTime, Utc};

use crate::models::{MembershipLevel, RedeemableReward};

/// Reasons a redemption is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedemptionError {
    #[error("Reward is not available")]
    Unavailable,

    #[error("Reward requires {required} membership, member is {actual}")]
    MembershipLevelTooLow {
        required: MembershipLevel,
        actual: MembershipLevel,
    },

    #[error("Redemption limit of {limit} per member reached")]
    LimitReached { limit: i32 },

    #[error("Insufficient points: balance {balance}, required {required}")]
    InsufficientPoints { balance: i32, required: i32 },
}

/// Facts about the member needed to decide a redemption.
#[derive(Debug, Clone, Copy)]
pub struct RedemptionContext {
    pub membership_level: MembershipLevel,
    pub balance: i32,
    /// How many times this member already redeemed this reward.
    pub previous_redemptions: i64,
    pub now: DateTime<Utc>,
}

/// Checks every redemption rule, in the order a member would want to hear
/// about them.
pub fn check_redemption(
    reward: &RedeemableReward,
    ctx: &RedemptionContext,
) -> Result<(), RedemptionError> {
    if !reward.is_available(ctx.now) {
        return Err(RedemptionError::Unavailable);
    }

    if ctx.membership_level < reward.min_membership_level {
        return Err(RedemptionError::MembershipLevelTooLow {
            required: reward.min_membership_level,
            actual: ctx.membership_level,
        });
    }

    if let Some(limit) = reward.max_redemptions_per_user {
        if ctx.previous_redemptions >= i64::from(limit) {
            return Err(RedemptionError::LimitReached { limit });
        }
    }

    if ctx.balance < reward.points_required {
        return Err(RedemptionError::InsufficientPoints {
            balance: ctx.balance,
            required: reward.points_required,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RewardCategory;
    use uuid::Uuid;

    fn reward() -> RedeemableReward {
        RedeemableReward {
            id: Uuid::new_v4(),
            name: "Personal training session".to_string(),
            description: Some("One hour with a trainer".to_string()),
            points_required: 300,
            category: RewardCategory::Service,
            is_active: true,
            stock: 5,
            valid_until: None,
            min_membership_level: MembershipLevel::Silver,
            max_redemptions_per_user: Some(2),
            total_redemptions: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ctx() -> RedemptionContext {
        RedemptionContext {
            membership_level: MembershipLevel::Gold,
            balance: 500,
            previous_redemptions: 0,
            now: Utc::now(),
        }
    }

    #[test]
    fn test_eligible() {
        assert!(check_redemption(&reward(), &ctx()).is_ok());
    }

    #[test]
    fn test_out_of_stock() {
        let r = RedeemableReward { stock: 0, ..reward() };
        assert_eq!(check_redemption(&r, &ctx()), Err(RedemptionError::Unavailable));
    }

    #[test]
    fn test_level_too_low() {
        let c = RedemptionContext {
            membership_level: MembershipLevel::Basic,
            ..ctx()
        };
        assert!(matches!(
            check_redemption(&reward(), &c),
            Err(RedemptionError::MembershipLevelTooLow { .. })
        ));
    }

    #[test]
    fn test_limit_reached() {
        let c = RedemptionContext {
            previous_redemptions: 2,
            ..ctx()
        };
        assert_eq!(
            check_redemption(&reward(), &c),
            Err(RedemptionError::LimitReached { limit: 2 })
        );
    }

    #[test]
    fn test_insufficient_points() {
        let c = RedemptionContext { balance: 299, ..ctx() };
        assert_eq!(
            check_redemption(&reward(), &c),
            Err(RedemptionError::InsufficientPoints {
                balance: 299,
                required: 300
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = RedemptionError::MembershipLevelTooLow {
            required: MembershipLevel::Gold,
            actual: MembershipLevel::Basic,
        };
        assert_eq!(
            err.to_string(),
            "Reward requires gold membership, member is basic"
        );
    }
}
