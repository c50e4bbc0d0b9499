//! Ledger projection routes.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_db::entities::ledgers;
use tally_db::repositories::LedgerRepository;
use tally_shared::types::money::fixed4;
use tally_shared::types::{AccountId, TransactionId};
use tracing::{error, info};
use uuid::Uuid;

use super::success;
use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
};

/// Creates the ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledgers", post(open_ledger))
        .route("/ledgers/update", post(apply_transaction))
        .route("/ledgers/{account_id}", get(get_ledger))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for opening a ledger row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenLedgerRequest {
    /// Account to open the ledger row for.
    pub account_id: Uuid,
}

/// Request body for applying a transaction to the projection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTransactionRequest {
    /// Transaction to apply.
    pub transaction_id: Uuid,
}

/// Response for a ledger row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    /// Ledger row ID.
    pub id: Uuid,
    /// Account the row projects.
    pub account_id: Uuid,
    /// Projected balance (debits add, credits subtract).
    #[serde(with = "fixed4")]
    pub balance: Decimal,
    /// Last time a transaction was applied (RFC 3339).
    pub last_updated: String,
}

impl From<ledgers::Model> for LedgerResponse {
    fn from(m: ledgers::Model) -> Self {
        Self {
            id: m.id,
            account_id: m.account_id,
            balance: m.balance,
            last_updated: m.last_updated.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/ledgers` - Open the ledger row for an account.
async fn open_ledger(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<OpenLedgerRequest>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.open_ledger(AccountId::from_uuid(payload.account_id)).await {
        Ok(ledger) => {
            info!(account_id = %payload.account_id, "Ledger opened");
            success(
                StatusCode::CREATED,
                "Ledger created successfully",
                "ledger",
                LedgerResponse::from(ledger),
            )
        }
        Err(e) => {
            error!(error = %e, account_id = %payload.account_id, "Failed to open ledger");
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/ledgers/{account_id}` - Get an account's ledger row.
async fn get_ledger(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(account_id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.get_ledger(AccountId::from_uuid(account_id)).await {
        Ok(ledger) => success(
            StatusCode::OK,
            "Ledger retrieved successfully",
            "ledger",
            LedgerResponse::from(ledger),
        ),
        Err(e) => {
            error!(error = %e, account_id = %account_id, "Failed to get ledger");
            ApiError::from(e).into_response()
        }
    }
}

/// POST `/ledgers/update` - Apply a stored transaction to the projection, once.
async fn apply_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<ApplyTransactionRequest>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo
        .apply_transaction(TransactionId::from_uuid(payload.transaction_id))
        .await
    {
        Ok(applied) => {
            info!(
                transaction_id = %applied.transaction_id,
                ledgers = applied.ledgers.len(),
                "Transaction applied to ledger"
            );
            let data: Vec<LedgerResponse> = applied.ledgers.into_iter().map(Into::into).collect();
            success(StatusCode::OK, "Ledger updated successfully", "ledgers", data)
        }
        Err(e) => {
            error!(error = %e, transaction_id = %payload.transaction_id, "Failed to apply transaction to ledger");
            ApiError::from(e).into_response()
        }
    }
}
