//! Repository implementations for database operations.

pub mod alert_preference;
pub mod loyalty;
pub mod member;
pub mod reward;

pub use alert_preference::AlertPreferenceRepository;
pub use loyalty::LoyaltyRepository;
pub use member::MemberRepository;
pub use reward::{Redemption, RewardRepository};
