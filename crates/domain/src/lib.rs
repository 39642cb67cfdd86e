//! Domain layer for the gym alerts backend.
//!
//! This crate contains:
//! - Domain models (subscription alerts, preferences, loyalty ledger, rewards)
//! - Business logic services (classification, dedup gate, ledger rules)
//! - Domain error types

pub mod models;
pub mod services;
