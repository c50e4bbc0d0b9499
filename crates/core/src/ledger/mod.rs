//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Leg validation (both sides present, positive amounts, equal totals)
//! - Posting resolution into per-account balance deltas
//! - Ledger projection planning
//! - Stored transaction aggregate
//! - Balance arithmetic
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod service;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::{RunningBalance, apply_deltas};
pub use error::LedgerError;
pub use service::{AccountInfo, LedgerService};
pub use transaction::{Leg, Transaction};
pub use types::{
    BalanceDelta, LegInput, PaymentType, PostTransactionInput, PreparedPosting, Side,
    TransactionPatch, TransactionTotals, TransactionType,
};
pub use validation::validate_legs;
