//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during report generation.
///
/// Any error aborts the whole report; partial reports are never produced.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A required date parameter was not supplied.
    #[error("{0} is required (YYYY-MM-DD)")]
    MissingDate(&'static str),

    /// A date parameter could not be parsed.
    #[error("Invalid {field}: '{value}' is not a YYYY-MM-DD date")]
    InvalidDate {
        /// Parameter name.
        field: &'static str,
        /// Raw value received.
        value: String,
    },

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The account a report was requested for does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// A leg references an account that could not be resolved.
    #[error("Transaction {transaction_id} references unknown account {account_id}")]
    UnresolvedAccount {
        /// Transaction holding the leg.
        transaction_id: Uuid,
        /// Account that could not be resolved.
        account_id: Uuid,
    },

    /// Database error while fetching report inputs.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingDate(_) | Self::InvalidDate { .. } => "INVALID_DATE",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::UnresolvedAccount { .. } | Self::Database(_) => "REPORT_GENERATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingDate(_) | Self::InvalidDate { .. } | Self::InvalidDateRange { .. } => 400,
            Self::AccountNotFound(_) => 404,
            Self::UnresolvedAccount { .. } | Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert_eq!(ReportError::MissingDate("startDate").http_status_code(), 400);
        assert_eq!(
            ReportError::InvalidDate {
                field: "endDate",
                value: "2024-13-01".into()
            }
            .to_string(),
            "Invalid endDate: '2024-13-01' is not a YYYY-MM-DD date"
        );
        assert_eq!(ReportError::AccountNotFound(Uuid::nil()).http_status_code(), 404);
    }

    #[test]
    fn test_generation_errors_are_server_errors() {
        let err = ReportError::UnresolvedAccount {
            transaction_id: Uuid::nil(),
            account_id: Uuid::nil(),
        };
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "REPORT_GENERATION_ERROR");
    }
}
