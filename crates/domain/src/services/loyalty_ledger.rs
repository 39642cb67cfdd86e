//! Loyalty ledger rules.
//!
//! The ledger is append-only. Every entry stores the balance after it was
//! applied, so the stored `remaining_points` must always equal the running
//! sum of `points`. The repository enforces this on insert using
//! [`next_balance`]; [`audit_ledger`] checks it after the fact.

use uuid::Uuid;

use crate::models::{LedgerAudit, LoyaltyPointsEntry};
use crate::models::loyalty::LedgerMismatch;

/// Errors raised when appending to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Points must be non-zero")]
    ZeroPoints,

    #[error("Insufficient points: balance {balance}, requested {requested}")]
    InsufficientPoints { balance: i32, requested: i32 },

    #[error("Balance overflow")]
    Overflow,
}

/// Balance after applying `points` to `previous`.
///
/// Debits may not take the balance below zero.
pub fn next_balance(previous: i32, points: i32) -> Result<i32, LedgerError> {
    if points == 0 {
        return Err(LedgerError::ZeroPoints);
    }
    let next = previous.checked_add(points).ok_or(LedgerError::Overflow)?;
    if next < 0 {
        return Err(LedgerError::InsufficientPoints {
            balance: previous,
            requested: -points,
        });
    }
    Ok(next)
}

/// Walks a member's entries in insertion order and reports the first entry
/// whose stored balance disagrees with the running sum.
pub fn audit_ledger(user_id: Uuid, entries: &[LoyaltyPointsEntry]) -> LedgerAudit {
    let mut running: i64 = 0;
    let mut first_mismatch = None;

    for entry in entries {
        running += i64::from(entry.points);
        if running != i64::from(entry.remaining_points) {
            first_mismatch = Some(LedgerMismatch {
                entry_id: entry.id,
                expected_remaining: running,
                recorded_remaining: entry.remaining_points,
            });
            break;
        }
    }

    LedgerAudit {
        user_id,
        consistent: first_mismatch.is_none(),
        entries_checked: entries.len(),
        first_mismatch,
    }
}
