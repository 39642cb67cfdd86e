//! Domain models for the gym alerts backend.

pub mod alert_preferences;
pub mod alert_session;
pub mod loyalty;
pub mod member;
pub mod reward;
pub mod subscription;
pub mod subscription_alert;

pub use alert_preferences::{AlertPreferences, UpdateAlertPreferencesRequest};
pub use alert_session::{GateDecision, GateState, NotificationPermission};
pub use loyalty::{
    LedgerAudit, LoyaltyPointsEntry, LoyaltyStats, LoyaltyTransactionType, NewLoyaltyEntry,
};
pub use member::{CreateMemberRequest, Member, MembershipLevel, UpdateSubscriptionRequest};
pub use reward::{
    CreateRewardRequest, RedeemableReward, RewardCategory, RewardResponse, UpdateRewardRequest,
};
pub use subscription::SubscriptionRecord;
pub use subscription_alert::{AlertSeverity, AlertSnapshot, AlertSummary, AlertType, SubscriptionAlert};
