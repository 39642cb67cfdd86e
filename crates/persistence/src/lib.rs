//! Persistence layer for the gym alerts backend.
//!
//! PostgreSQL repositories for members, alert preferences, the loyalty
//! ledger and the reward catalog.

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;

pub use error::RepositoryError;
