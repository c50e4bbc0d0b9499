//! Ledger error types for posting and projection.
//!
//! This module defines every error a posting or a ledger projection update can
//! raise: leg validation, missing references, and stored-state conflicts.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::Side;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Description is blank.
    #[error("Transaction description is required")]
    MissingDescription,

    /// One side of the posting has no legs.
    #[error("Transaction must have at least one {0:?} leg")]
    MissingLegs(Side),

    /// Leg amount cannot be zero.
    #[error("Leg amount cannot be zero (account {0})")]
    ZeroAmount(Uuid),

    /// Leg amount cannot be negative.
    #[error("Leg amount cannot be negative (account {0})")]
    NegativeAmount(Uuid),

    /// Leg amount has more fractional digits than money columns keep.
    #[error("Leg amount has more than 4 decimal places (account {0})")]
    AmountScale(Uuid),

    /// Transaction is not balanced (debits != credits).
    #[error("Debit and credit amounts are not balanced. Debit: {debit}, Credit: {credit}")]
    ImbalancedTransaction {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// A field that is fixed after posting was sent in an update.
    #[error("{0} cannot be changed after posting")]
    ImmutableField(&'static str),

    // ========== Not Found Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// No ledger row exists for the account.
    #[error("Ledger not found for account {0}")]
    LedgerNotFound(Uuid),

    // ========== Conflict Errors ==========
    /// A ledger row already exists for the account.
    #[error("Ledger already open for account {0}")]
    LedgerAlreadyOpen(Uuid),

    /// The transaction has already been applied to the ledger projection.
    #[error("Transaction {0} has already been applied to the ledger")]
    AlreadyApplied(Uuid),

    /// Posted transactions are never deleted.
    #[error("Transaction {0} is immutable; post an opposite transaction to correct it")]
    TransactionImmutable(Uuid),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::MissingLegs(_) => "MISSING_LEGS",
            Self::ZeroAmount(_) => "ZERO_AMOUNT",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::AmountScale(_) => "AMOUNT_SCALE",
            Self::ImbalancedTransaction { .. } => "IMBALANCED_TRANSACTION",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::ImmutableField(_) => "IMMUTABLE_FIELD",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::LedgerNotFound(_) => "LEDGER_NOT_FOUND",
            Self::LedgerAlreadyOpen(_) => "LEDGER_ALREADY_OPEN",
            Self::AlreadyApplied(_) => "ALREADY_APPLIED",
            Self::TransactionImmutable(_) => "TRANSACTION_IMMUTABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::MissingDescription
            | Self::MissingLegs(_)
            | Self::ZeroAmount(_)
            | Self::NegativeAmount(_)
            | Self::AmountScale(_)
            | Self::ImbalancedTransaction { .. }
            | Self::AccountInactive(_)
            | Self::ImmutableField(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::TransactionNotFound(_) | Self::LedgerNotFound(_) => {
                404
            }

            // 409 Conflict - stored state forbids the operation
            Self::LedgerAlreadyOpen(_) | Self::AlreadyApplied(_) | Self::TransactionImmutable(_) => {
                409
            }

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error was raised before any write could happen.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.http_status_code() == 400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::ImbalancedTransaction {
                debit: Decimal::new(30000, 2),
                credit: Decimal::new(25000, 2),
            }
            .error_code(),
            "IMBALANCED_TRANSACTION"
        );
        assert_eq!(LedgerError::MissingLegs(Side::Credit).error_code(), "MISSING_LEGS");
        assert_eq!(LedgerError::LedgerNotFound(Uuid::nil()).error_code(), "LEDGER_NOT_FOUND");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::ZeroAmount(Uuid::nil()).http_status_code(), 400);
        assert_eq!(LedgerError::AccountNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(LedgerError::TransactionNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(LedgerError::AlreadyApplied(Uuid::nil()).http_status_code(), 409);
        assert_eq!(LedgerError::TransactionImmutable(Uuid::nil()).http_status_code(), 409);
        assert_eq!(LedgerError::Database("test".to_string()).http_status_code(), 500);
    }

    #[test]
    fn test_validation_classification() {
        assert!(LedgerError::MissingDescription.is_validation());
        assert!(!LedgerError::AccountNotFound(Uuid::nil()).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::ImbalancedTransaction {
            debit: Decimal::new(30000, 2),
            credit: Decimal::new(25000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Debit and credit amounts are not balanced. Debit: 300.00, Credit: 250.00"
        );
        assert_eq!(
            LedgerError::MissingLegs(Side::Debit).to_string(),
            "Transaction must have at least one Debit leg"
        );
    }
}
