//! Gym member domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::subscription::SubscriptionRecord;

/// Membership tier. Ordering follows the tier ladder so that
/// `member.level >= reward.min_membership_level` is the eligibility check.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MembershipLevel {
    #[default]
    Basic,
    Silver,
    Gold,
    Platinum,
}

impl std::fmt::Display for MembershipLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipLevel::Basic => write!(f, "basic"),
            MembershipLevel::Silver => write!(f, "silver"),
            MembershipLevel::Gold => write!(f, "gold"),
            MembershipLevel::Platinum => write!(f, "platinum"),
        }
    }
}

/// A gym member with the subscription fields alerting reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub membership_level: MembershipLevel,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub renewal_reminder_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn to_subscription_record(&self) -> SubscriptionRecord {
        SubscriptionRecord::from_dates(
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.subscription_end_date,
            self.renewal_reminder_date,
        )
    }
}

/// Request payload for registering a member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    pub membership_level: MembershipLevel,

    pub subscription_end_date: Option<DateTime<Utc>>,

    pub renewal_reminder_date: Option<DateTime<Utc>>,
}

/// Request payload for changing a member's subscription (partial update).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub membership_level: Option<MembershipLevel>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub renewal_reminder_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}
