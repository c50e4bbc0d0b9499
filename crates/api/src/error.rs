//! Translation of every error the API can produce into one response shape.
//!
//! Bodies are always `{"success": false, "error": CODE, "message": text}`.
//! Server-side failures carry an opaque message; the detail goes to the log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tally_core::reports::ReportError;
use tally_db::repositories::{DirectoryRepoError, LedgerRepoError, ReportRepoError};
use tally_shared::AppError;

const INTERNAL_MESSAGE: &str = "Internal server error";
const REPORT_MESSAGE: &str = "Failed to generate report";

/// An error ready to be sent to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Stable SCREAMING_SNAKE code.
    pub code: &'static str,
    /// Message safe to show to the caller.
    pub message: String,
}

impl ApiError {
    /// Creates an error from its parts.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// A 400 with code `VALIDATION_ERROR`.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    fn from_parts(status: u16, code: &'static str, detail: String, opaque: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if status.is_server_error() {
            opaque.to_string()
        } else {
            detail
        };
        Self {
            status,
            code,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "success": false,
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.public_message(), INTERNAL_MESSAGE)
    }
}

impl From<DirectoryRepoError> for ApiError {
    fn from(e: DirectoryRepoError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string(), INTERNAL_MESSAGE)
    }
}

impl From<LedgerRepoError> for ApiError {
    fn from(e: LedgerRepoError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string(), INTERNAL_MESSAGE)
    }
}

impl From<ReportError> for ApiError {
    fn from(e: ReportError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string(), REPORT_MESSAGE)
    }
}

impl From<ReportRepoError> for ApiError {
    fn from(e: ReportRepoError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string(), REPORT_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use sea_orm::DbErr;
    use tally_core::directory::DirectoryError;
    use tally_core::ledger::LedgerError;
    use uuid::Uuid;

    #[test]
    fn test_imbalance_is_client_error_with_detail() {
        let err = ApiError::from(LedgerRepoError::from(LedgerError::ImbalancedTransaction {
            debit: dec!(300),
            credit: dec!(250),
        }));

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "IMBALANCED_TRANSACTION");
        assert!(err.message.contains("not balanced"));
    }

    #[rstest]
    #[case(LedgerError::TransactionNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(LedgerError::AlreadyApplied(Uuid::nil()), StatusCode::CONFLICT)]
    #[case(LedgerError::TransactionImmutable(Uuid::nil()), StatusCode::CONFLICT)]
    #[case(LedgerError::ImmutableField("debitAccounts"), StatusCode::BAD_REQUEST)]
    fn test_ledger_status_mapping(#[case] e: LedgerError, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(LedgerRepoError::from(e)).status, status);
    }

    #[test]
    fn test_database_detail_is_hidden() {
        let err = ApiError::from(DirectoryRepoError::from(DbErr::Custom(
            "password authentication failed".to_string(),
        )));

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn test_report_failure_is_opaque() {
        let err = ApiError::from(ReportError::UnresolvedAccount {
            transaction_id: Uuid::nil(),
            account_id: Uuid::nil(),
        });

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "REPORT_GENERATION_ERROR");
        assert_eq!(err.message, REPORT_MESSAGE);
    }

    #[test]
    fn test_in_use_is_conflict() {
        let err = ApiError::from(DirectoryRepoError::from(DirectoryError::InUse {
            entity: "account",
            id: Uuid::nil(),
            referenced_by: "transactions",
        }));

        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "IN_USE");
    }
}
