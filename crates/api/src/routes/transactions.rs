//! Transaction routes.
//!
//! Posting is the only write that moves balances. Stored transactions are
//! append-only: their legs and amount never change and they are never deleted.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::ledger::{
    Leg, LedgerError, LegInput, PaymentType, PostTransactionInput, Transaction, TransactionPatch,
    TransactionType,
};
use tally_core::reports::{end_of_day, start_of_day};
use tally_db::repositories::{LedgerRepoError, TransactionFilter, TransactionRepository};
use tally_shared::types::money::fixed4;
use tally_shared::types::{AccountId, PageMeta, PageRequest, TransactionId};
use tracing::{error, info};
use uuid::Uuid;

use super::success;
use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    /// Inclusive start date (YYYY-MM-DD).
    pub start_date: Option<String>,
    /// Inclusive end date (YYYY-MM-DD), through 23:59:59.999.
    pub end_date: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// One `{accountId, amount}` leg in a request or response.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegDto {
    /// Account posted to.
    pub account_id: Uuid,
    /// Positive amount.
    #[serde(with = "fixed4")]
    pub amount: Decimal,
}

impl From<&LegDto> for LegInput {
    fn from(leg: &LegDto) -> Self {
        LegInput::new(AccountId::from_uuid(leg.account_id), leg.amount)
    }
}

impl From<Leg> for LegDto {
    fn from(leg: Leg) -> Self {
        Self {
            account_id: leg.account_id.into_inner(),
            amount: leg.amount,
        }
    }
}

/// Request body for posting a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// Description.
    pub description: String,
    /// Debit legs.
    pub debit_accounts: Vec<LegDto>,
    /// Credit legs.
    pub credit_accounts: Vec<LegDto>,
    /// Transfer, Debit or Credit.
    pub transaction_type: TransactionType,
    /// Cash or Bank.
    pub payment_type: PaymentType,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Request body for updating a transaction.
///
/// Leg and amount fields are captured only so they can be refused.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    /// New description.
    pub description: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// New transaction type.
    pub transaction_type: Option<TransactionType>,
    /// New payment type.
    pub payment_type: Option<PaymentType>,
    /// Refused.
    pub debit_accounts: Option<Value>,
    /// Refused.
    pub credit_accounts: Option<Value>,
    /// Refused.
    pub amount: Option<Value>,
}

impl UpdateTransactionRequest {
    /// Name of the first immutable field present in the body.
    fn immutable_field(&self) -> Option<&'static str> {
        if self.debit_accounts.is_some() {
            Some("debitAccounts")
        } else if self.credit_accounts.is_some() {
            Some("creditAccounts")
        } else if self.amount.is_some() {
            Some("amount")
        } else {
            None
        }
    }
}

/// Response for a transaction with its legs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Description.
    pub description: String,
    /// Debit legs in posting order.
    pub debit_accounts: Vec<LegDto>,
    /// Credit legs in posting order.
    pub credit_accounts: Vec<LegDto>,
    /// Posting user.
    pub created_by: Uuid,
    /// Total of either side.
    #[serde(with = "fixed4")]
    pub amount: Decimal,
    /// Whether the ledger projection has absorbed it.
    pub is_posted: bool,
    /// Notes.
    pub notes: Option<String>,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Payment type.
    pub payment_type: PaymentType,
    /// Posting time (RFC 3339).
    pub created_at: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id.into_inner(),
            description: t.description,
            debit_accounts: t.debit_legs.into_iter().map(Into::into).collect(),
            credit_accounts: t.credit_legs.into_iter().map(Into::into).collect(),
            created_by: t.created_by.into_inner(),
            amount: t.amount,
            is_posted: t.is_posted,
            notes: t.notes,
            transaction_type: t.transaction_type,
            payment_type: t.payment_type,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

/// Page of transactions.
#[derive(Debug, Serialize)]
pub struct TransactionPage {
    /// Transactions, newest first.
    pub data: Vec<TransactionResponse>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                ApiError::validation(format!("Invalid {field}: '{v}' is not a YYYY-MM-DD date"))
            })
        })
        .transpose()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/transactions` - List transactions with legs, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ListTransactionsQuery>,
) -> impl IntoResponse {
    let (from, to) = match (
        parse_date("startDate", query.start_date.as_deref()),
        parse_date("endDate", query.end_date.as_deref()),
    ) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return e.into_response(),
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let filter = TransactionFilter {
        from: from.map(start_of_day),
        to: to.map(end_of_day),
    };
    let page = PageRequest::from_query(query.page, query.per_page);

    match repo.list_transactions(filter, page).await {
        Ok(result) => {
            let data = TransactionPage {
                data: result.data.into_iter().map(Into::into).collect(),
                meta: result.meta,
            };
            success(StatusCode::OK, "Transactions retrieved successfully", "transactions", data)
        }
        Err(e) => {
            error!(error = %e, "Failed to list transactions");
            ApiError::from(e).into_response()
        }
    }
}

/// POST `/transactions` - Post a balanced transaction.
///
/// All referenced account balances move in one database transaction.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateTransactionRequest>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());
    let input = PostTransactionInput {
        description: payload.description,
        debit_legs: payload.debit_accounts.iter().map(Into::into).collect(),
        credit_legs: payload.credit_accounts.iter().map(Into::into).collect(),
        created_by: auth.user_id(),
        transaction_type: payload.transaction_type,
        payment_type: payload.payment_type,
        notes: payload.notes,
    };

    match repo.post_transaction(input).await {
        Ok(transaction) => {
            info!(
                transaction_id = %transaction.id,
                amount = %transaction.amount,
                user_id = %auth.user_id(),
                "Transaction posted"
            );
            success(
                StatusCode::CREATED,
                "Transaction created successfully",
                "transaction",
                TransactionResponse::from(transaction),
            )
        }
        Err(e) => {
            error!(error = %e, user_id = %auth.user_id(), "Failed to post transaction");
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/transactions/{id}` - Get a transaction with its legs.
async fn get_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.get_transaction(TransactionId::from_uuid(id)).await {
        Ok(transaction) => success(
            StatusCode::OK,
            "Transaction retrieved successfully",
            "transaction",
            TransactionResponse::from(transaction),
        ),
        Err(e) => {
            error!(error = %e, transaction_id = %id, "Failed to get transaction");
            ApiError::from(e).into_response()
        }
    }
}

/// PUT `/transactions/{id}` - Update descriptive fields.
async fn update_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateTransactionRequest>,
) -> impl IntoResponse {
    if let Some(field) = payload.immutable_field() {
        return ApiError::from(LedgerRepoError::from(LedgerError::ImmutableField(field)))
            .into_response();
    }

    let repo = TransactionRepository::new((*state.db).clone());
    let patch = TransactionPatch {
        description: payload.description,
        notes: payload.notes,
        transaction_type: payload.transaction_type,
        payment_type: payload.payment_type,
    };

    match repo.update_transaction(TransactionId::from_uuid(id), patch).await {
        Ok(transaction) => {
            info!(transaction_id = %id, "Transaction updated");
            success(
                StatusCode::OK,
                "Transaction updated successfully",
                "transaction",
                TransactionResponse::from(transaction),
            )
        }
        Err(e) => {
            error!(error = %e, transaction_id = %id, "Failed to update transaction");
            ApiError::from(e).into_response()
        }
    }
}

/// DELETE `/transactions/{id}` - Always refused; post an opposite transaction instead.
async fn delete_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    let e = repo.delete_transaction(TransactionId::from_uuid(id)).await;
    error!(error = %e, transaction_id = %id, "Refused to delete transaction");
    ApiError::from(e).into_response()
}
