//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `directory` - Account types, sub-types, categories and accounts
//! - `ledger` - Double-entry posting rules and the ledger projection
//! - `reports` - Report folds over a transaction window

pub mod directory;
pub mod ledger;
pub mod reports;
