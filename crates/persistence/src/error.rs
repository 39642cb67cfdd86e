//! Repository error type for operations that enforce domain rules inside
//! a transaction.

use domain::services::{LedgerError, RedemptionError};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Redemption(#[from] RedemptionError),

    #[error("{0} not found")]
    NotFound(&'static str),
}
