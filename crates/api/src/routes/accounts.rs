//! Account management routes.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::directory::BalanceVerification;
use tally_db::repositories::{
    AccountFilter, AccountRepository, AccountWithRefs, CreateAccountInput, UpdateAccountInput,
};
use tally_shared::types::money::fixed4;
use tally_shared::types::{AccountCategoryId, AccountId, AccountSubTypeId, AccountTypeId};
use tracing::{error, info};
use uuid::Uuid;

use super::account_categories::AccountCategoryResponse;
use super::account_sub_types::AccountSubTypeResponse;
use super::account_types::AccountTypeResponse;
use super::{nullable, success};
use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/{id}/verify", get(verify_account_balance))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsQuery {
    /// Filter by account type name, e.g. `assets`.
    pub account_type: Option<String>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type_id: Uuid,
    /// Sub-type; must belong to the account type.
    pub account_sub_type_id: Uuid,
    /// Reporting category.
    pub account_category_id: Uuid,
    /// Opening balance (default 0).
    pub opening_balance: Option<Decimal>,
    /// Whether the account is active (default true).
    pub is_active: Option<bool>,
    /// Description.
    pub description: Option<String>,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    /// Account name.
    pub account_name: Option<String>,
    /// Account type.
    pub account_type_id: Option<Uuid>,
    /// Sub-type.
    pub account_sub_type_id: Option<Uuid>,
    /// Reporting category.
    pub account_category_id: Option<Uuid>,
    /// New opening balance; the current balance shifts by the same amount.
    pub opening_balance: Option<Decimal>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
    /// Description; `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

/// Response for an account with its classification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type: AccountTypeResponse,
    /// Sub-type.
    pub account_sub_type: AccountSubTypeResponse,
    /// Reporting category.
    pub account_category: AccountCategoryResponse,
    /// Opening balance.
    #[serde(with = "fixed4")]
    pub opening_balance: Decimal,
    /// Stored balance (debits add, credits subtract).
    #[serde(with = "fixed4")]
    pub current_balance: Decimal,
    /// Balance as presented for the account's type.
    #[serde(with = "fixed4")]
    pub display_balance: Decimal,
    /// Creator.
    pub created_by: Uuid,
    /// Whether postings may reference the account.
    pub is_active: bool,
    /// Description.
    pub description: Option<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl From<AccountWithRefs> for AccountResponse {
    fn from(a: AccountWithRefs) -> Self {
        let display_balance = a
            .account_type
            .kind()
            .presentation_balance(a.account.current_balance);

        Self {
            id: a.account.id.into_inner(),
            account_name: a.account.account_name,
            account_type: a.account_type.into(),
            account_sub_type: a.sub_type.into(),
            account_category: a.category.into(),
            opening_balance: a.account.opening_balance,
            current_balance: a.account.current_balance,
            display_balance,
            created_by: a.account.created_by.into_inner(),
            is_active: a.account.is_active,
            description: a.account.description,
            created_at: a.account.created_at.to_rfc3339(),
        }
    }
}

/// Response for a balance check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceVerificationResponse {
    /// Account ID.
    pub account_id: Uuid,
    /// Balance held on the account row.
    #[serde(with = "fixed4")]
    pub stored_balance: Decimal,
    /// Opening balance plus debits minus credits from the leg history.
    #[serde(with = "fixed4")]
    pub computed_balance: Decimal,
    /// Stored minus computed.
    #[serde(with = "fixed4")]
    pub difference: Decimal,
    /// True when the two agree.
    pub is_consistent: bool,
}

impl From<BalanceVerification> for BalanceVerificationResponse {
    fn from(v: BalanceVerification) -> Self {
        Self {
            account_id: v.account_id.into_inner(),
            stored_balance: v.stored_balance,
            computed_balance: v.computed_balance,
            difference: v.difference,
            is_consistent: v.is_consistent,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/accounts` - List accounts with type, sub-type and category.
async fn list_accounts(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ListAccountsQuery>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());
    let filter = AccountFilter {
        account_type: query.account_type,
    };

    match repo.list_accounts(filter).await {
        Ok(accounts) => {
            let data: Vec<AccountResponse> = accounts.into_iter().map(Into::into).collect();
            success(StatusCode::OK, "Accounts retrieved successfully", "accounts", data)
        }
        Err(e) => {
            error!(error = %e, "Failed to list accounts");
            ApiError::from(e).into_response()
        }
    }
}

/// POST `/accounts` - Create an account.
///
/// The current balance starts at the opening balance. `createdBy` is the caller.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateAccountRequest>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());
    let input = CreateAccountInput {
        account_name: payload.account_name,
        account_type_id: AccountTypeId::from_uuid(payload.account_type_id),
        account_sub_type_id: AccountSubTypeId::from_uuid(payload.account_sub_type_id),
        account_category_id: AccountCategoryId::from_uuid(payload.account_category_id),
        opening_balance: payload.opening_balance.unwrap_or(Decimal::ZERO),
        created_by: auth.user_id(),
        is_active: payload.is_active.unwrap_or(true),
        description: payload.description,
    };

    match repo.create_account(input).await {
        Ok(created) => {
            info!(
                account_id = %created.account.id,
                user_id = %auth.user_id(),
                "Account created"
            );
            success(
                StatusCode::CREATED,
                "Account created successfully",
                "account",
                AccountResponse::from(created),
            )
        }
        Err(e) => {
            error!(error = %e, user_id = %auth.user_id(), "Failed to create account");
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/accounts/{id}` - Get an account.
async fn get_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.find_account(AccountId::from_uuid(id)).await {
        Ok(found) => success(
            StatusCode::OK,
            "Account retrieved successfully",
            "account",
            AccountResponse::from(found),
        ),
        Err(e) => {
            error!(error = %e, account_id = %id, "Failed to get account");
            ApiError::from(e).into_response()
        }
    }
}

/// PUT `/accounts/{id}` - Update an account.
async fn update_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateAccountRequest>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());
    let input = UpdateAccountInput {
        account_name: payload.account_name,
        account_type_id: payload.account_type_id.map(AccountTypeId::from_uuid),
        account_sub_type_id: payload.account_sub_type_id.map(AccountSubTypeId::from_uuid),
        account_category_id: payload.account_category_id.map(AccountCategoryId::from_uuid),
        opening_balance: payload.opening_balance,
        is_active: payload.is_active,
        description: payload.description,
    };

    match repo.update_account(AccountId::from_uuid(id), input).await {
        Ok(updated) => {
            info!(account_id = %id, "Account updated");
            success(
                StatusCode::OK,
                "Account updated successfully",
                "account",
                AccountResponse::from(updated),
            )
        }
        Err(e) => {
            error!(error = %e, account_id = %id, "Failed to update account");
            ApiError::from(e).into_response()
        }
    }
}

/// DELETE `/accounts/{id}` - Delete an account with no postings and no ledger row.
async fn delete_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.delete_account(AccountId::from_uuid(id)).await {
        Ok(()) => {
            info!(account_id = %id, "Account deleted");
            success(StatusCode::OK, "Account deleted successfully", "id", id)
        }
        Err(e) => {
            error!(error = %e, account_id = %id, "Failed to delete account");
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/accounts/{id}/verify` - Recompute the balance from the leg history.
async fn verify_account_balance(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.verify_balance(AccountId::from_uuid(id)).await {
        Ok(verification) => {
            if !verification.is_consistent {
                tracing::warn!(
                    account_id = %id,
                    difference = %verification.difference,
                    "Stored balance disagrees with posting history"
                );
            }
            success(
                StatusCode::OK,
                "Balance verified",
                "verification",
                BalanceVerificationResponse::from(verification),
            )
        }
        Err(e) => {
            error!(error = %e, account_id = %id, "Failed to verify account balance");
            ApiError::from(e).into_response()
        }
    }
}
