//! Loyalty points ledger domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::LedgerCursor;
use uuid::Uuid;
use validator::Validate;

/// Kind of ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyTransactionType {
    Earned,
    Redeemed,
    Bonus,
    Adjustment,
    Expired,
    Refund,
}

impl LoyaltyTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyTransactionType::Earned => "earned",
            LoyaltyTransactionType::Redeemed => "redeemed",
            LoyaltyTransactionType::Bonus => "bonus",
            LoyaltyTransactionType::Adjustment => "adjustment",
            LoyaltyTransactionType::Expired => "expired",
            LoyaltyTransactionType::Refund => "refund",
        }
    }
}

impl std::fmt::Display for LoyaltyTransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger entry.
///
/// `remaining_points` is the member's balance after this entry and always
/// equals the running sum of `points` up to and including it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyPointsEntry {
    pub id: i64,
    pub user_id: Uuid,
    pub points: i32,
    #[serde(rename = "type")]
    pub transaction_type: LoyaltyTransactionType,
    pub reason: String,
    pub remaining_points: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&LoyaltyPointsEntry> for LedgerCursor {
    fn from(entry: &LoyaltyPointsEntry) -> Self {
        LedgerCursor::after(entry.id)
    }
}

/// Values for a new ledger entry; the balance is computed on insert.
#[derive(Debug, Clone)]
pub struct NewLoyaltyEntry {
    pub user_id: Uuid,
    pub points: i32,
    pub transaction_type: LoyaltyTransactionType,
    pub reason: String,
    pub reward_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub attendance_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
}

/// Request payload for appending a ledger entry.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoyaltyEntryRequest {
    #[validate(range(min = -100000, max = 100000, message = "Points must be between -100000 and 100000"))]
    pub points: i32,

    #[serde(rename = "type")]
    pub transaction_type: LoyaltyTransactionType,

    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,

    pub payment_id: Option<Uuid>,

    pub attendance_id: Option<Uuid>,

    pub admin_id: Option<Uuid>,
}

impl CreateLoyaltyEntryRequest {
    pub fn into_new_entry(self, user_id: Uuid) -> NewLoyaltyEntry {
        NewLoyaltyEntry {
            user_id,
            points: self.points,
            transaction_type: self.transaction_type,
            reason: self.reason,
            reward_id: None,
            payment_id: self.payment_id,
            attendance_id: self.attendance_id,
            admin_id: self.admin_id,
        }
    }
}

/// Aggregated loyalty figures for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyStats {
    pub user_id: Uuid,
    pub balance: i32,
    pub total_earned: i64,
    pub total_redeemed: i64,
    pub entry_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl LoyaltyStats {
    /// Stats for a member with no ledger entries.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            balance: 0,
            total_earned: 0,
            total_redeemed: 0,
            entry_count: 0,
            last_activity_at: None,
        }
    }
}

/// Query parameters for paging through a member's history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyHistoryQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// One page of ledger history, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyHistoryResponse {
    pub entries: Vec<LoyaltyPointsEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// First ledger entry whose stored balance disagrees with the running sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMismatch {
    pub entry_id: i64,
    pub expected_remaining: i64,
    pub recorded_remaining: i32,
}

/// Result of auditing a member's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAudit {
    pub user_id: Uuid,
    pub consistent: bool,
    pub entries_checked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_mismatch: Option<LedgerMismatch>,
}
