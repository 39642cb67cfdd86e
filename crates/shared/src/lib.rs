//! Shared utilities and common types for the gym alerts backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Lenient date parsing and day arithmetic
//! - Ledger history cursors
//! - Common validation logic

pub mod dates;
pub mod pagination;
pub mod validation;
