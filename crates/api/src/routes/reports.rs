//! Report routes.
//!
//! Every report takes `startDate` and `endDate` (YYYY-MM-DD, end of day
//! inclusive). A report either completes or fails as a whole.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::directory::Account;
use tally_core::reports::{AssetSnapshot, DateRange};
use tally_db::repositories::ReportRepository;
use tally_shared::types::AccountId;
use tally_shared::types::money::fixed4;
use tracing::{debug, error};
use uuid::Uuid;

use super::{success, success_with};
use crate::{AppState, error::ApiError, extractors::ApiQuery, middleware::AuthUser};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/arap/assets", get(opening_assets))
        .route("/reports/arap/closingAsset", get(closing_assets))
        .route("/reports/profit-loss", get(profit_loss))
        .route("/reports/arap/received", get(received_paid))
        .route("/reports/ledger", get(account_ledger))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters shared by all reports.
///
/// Dates are kept as text so a bad value yields a field-specific message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// Inclusive start date.
    pub start_date: Option<String>,
    /// Inclusive end date.
    pub end_date: Option<String>,
    /// Subject account for the ledger report.
    pub account_id: Option<String>,
}

impl ReportQuery {
    fn range(&self) -> Result<DateRange, ApiError> {
        Ok(DateRange::parse(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )?)
    }

    fn account_id(&self) -> Result<AccountId, ApiError> {
        let raw = self
            .account_id
            .as_deref()
            .ok_or_else(|| ApiError::validation("accountId is required"))?;
        raw.trim()
            .parse::<Uuid>()
            .map(AccountId::from_uuid)
            .map_err(|_| ApiError::validation(format!("Invalid accountId: '{raw}'")))
    }
}

/// Account echoed alongside its ledger report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account name.
    pub account_name: String,
    /// Opening balance.
    #[serde(with = "fixed4")]
    pub opening_balance: Decimal,
    /// Stored balance.
    #[serde(with = "fixed4")]
    pub current_balance: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
}

impl From<Account> for ReportAccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id.into_inner(),
            account_name: a.account_name,
            opening_balance: a.opening_balance,
            current_balance: a.current_balance,
            is_active: a.is_active,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn asset_snapshot(
    state: &AppState,
    query: &ReportQuery,
    snapshot: AssetSnapshot,
) -> axum::response::Response {
    let range = match query.range() {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    let repo = ReportRepository::new((*state.db).clone());
    match repo.asset_balances(range, snapshot).await {
        Ok(report) => {
            debug!(as_of = %report.as_of, accounts = report.accounts.len(), "Asset balances generated");
            success(StatusCode::OK, "Asset balances generated successfully", "reportData", report)
        }
        Err(e) => {
            error!(
                error = %e,
                start_date = %range.start_date,
                end_date = %range.end_date,
                snapshot = ?snapshot,
                "Failed to generate asset balance report"
            );
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/reports/arap/assets` - Asset balances as of the start date.
async fn opening_assets(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> impl IntoResponse {
    asset_snapshot(&state, &query, AssetSnapshot::Opening).await
}

/// GET `/reports/arap/closingAsset` - Asset balances as of the end date.
async fn closing_assets(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> impl IntoResponse {
    asset_snapshot(&state, &query, AssetSnapshot::Closing).await
}

/// GET `/reports/profit-loss` - Income, expenses and their difference.
async fn profit_loss(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> impl IntoResponse {
    let range = match query.range() {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    let repo = ReportRepository::new((*state.db).clone());
    match repo.profit_loss(range).await {
        Ok(report) => success(
            StatusCode::OK,
            "Profit and loss generated successfully",
            "reportData",
            report,
        ),
        Err(e) => {
            error!(
                error = %e,
                start_date = %range.start_date,
                end_date = %range.end_date,
                "Failed to generate profit and loss report"
            );
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/reports/arap/received` - Activity per account category.
async fn received_paid(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> impl IntoResponse {
    let range = match query.range() {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    let repo = ReportRepository::new((*state.db).clone());
    match repo.received_paid(range).await {
        Ok(report) => success(
            StatusCode::OK,
            "Received and paid report generated successfully",
            "reportData",
            report,
        ),
        Err(e) => {
            error!(
                error = %e,
                start_date = %range.start_date,
                end_date = %range.end_date,
                "Failed to generate received/paid report"
            );
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/reports/ledger?accountId=` - Per-account detail with running balance.
async fn account_ledger(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> impl IntoResponse {
    let (account_id, range) = match (query.account_id(), query.range()) {
        (Ok(id), Ok(range)) => (id, range),
        (Err(e), _) | (_, Err(e)) => return e.into_response(),
    };

    let repo = ReportRepository::new((*state.db).clone());
    match repo.account_ledger(account_id, range).await {
        Ok(view) => success_with(
            StatusCode::OK,
            "Ledger report generated successfully",
            [
                ("account", serde_json::to_value(ReportAccountResponse::from(view.account))),
                ("reportData", serde_json::to_value(view.report)),
            ],
        ),
        Err(e) => {
            error!(
                error = %e,
                account_id = %account_id,
                start_date = %range.start_date,
                end_date = %range.end_date,
                "Failed to generate ledger report"
            );
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: Option<&str>, end: Option<&str>, account: Option<&str>) -> ReportQuery {
        ReportQuery {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            account_id: account.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_end_date_is_bad_request() {
        let err = query(Some("2026-01-01"), None, None).range().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_DATE");
    }

    #[test]
    fn test_reversed_range_is_bad_request() {
        let err = query(Some("2026-02-01"), Some("2026-01-01"), None)
            .range()
            .unwrap_err();
        assert_eq!(err.code, "INVALID_DATE_RANGE");
    }

    #[test]
    fn test_account_id_must_be_uuid() {
        let err = query(None, None, Some("cash")).account_id().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = query(None, None, None).account_id().unwrap_err();
        assert_eq!(err.message, "accountId is required");
    }
}
