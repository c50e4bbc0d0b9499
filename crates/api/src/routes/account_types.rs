//! Account type routes.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tally_core::directory::AccountType;
use tally_db::repositories::{CreateAccountTypeInput, DirectoryRepository, UpdateAccountTypeInput};
use tally_shared::types::AccountTypeId;
use tracing::{error, info};
use uuid::Uuid;

use super::{nullable, success};
use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
};

/// Creates the account type routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account-types", get(list_account_types).post(create_account_type))
        .route(
            "/account-types/{id}",
            get(get_account_type)
                .put(update_account_type)
                .delete(delete_account_type),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an account type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountTypeRequest {
    /// Type name, e.g. "assets".
    pub type_name: String,
    /// Description.
    pub description: Option<String>,
}

/// Request body for updating an account type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountTypeRequest {
    /// New name.
    pub type_name: Option<String>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

/// Response for an account type.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTypeResponse {
    /// Type ID.
    pub id: Uuid,
    /// Type name.
    pub type_name: String,
    /// Description.
    pub description: Option<String>,
}

impl From<AccountType> for AccountTypeResponse {
    fn from(t: AccountType) -> Self {
        Self {
            id: t.id.into_inner(),
            type_name: t.type_name,
            description: t.description,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/account-types` - List account types.
async fn list_account_types(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo.list_account_types().await {
        Ok(types) => {
            let data: Vec<AccountTypeResponse> = types.into_iter().map(Into::into).collect();
            success(StatusCode::OK, "Account types retrieved successfully", "accountTypes", data)
        }
        Err(e) => {
            error!(error = %e, "Failed to list account types");
            ApiError::from(e).into_response()
        }
    }
}

/// POST `/account-types` - Create an account type.
async fn create_account_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<CreateAccountTypeRequest>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());
    let input = CreateAccountTypeInput {
        type_name: payload.type_name,
        description: payload.description,
    };

    match repo.create_account_type(input).await {
        Ok(created) => {
            info!(account_type_id = %created.id, type_name = %created.type_name, "Account type created");
            success(
                StatusCode::CREATED,
                "Account type created successfully",
                "accountType",
                AccountTypeResponse::from(created),
            )
        }
        Err(e) => {
            error!(error = %e, "Failed to create account type");
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/account-types/{id}` - Get an account type.
async fn get_account_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo.find_account_type(AccountTypeId::from_uuid(id)).await {
        Ok(found) => success(
            StatusCode::OK,
            "Account type retrieved successfully",
            "accountType",
            AccountTypeResponse::from(found),
        ),
        Err(e) => {
            error!(error = %e, account_type_id = %id, "Failed to get account type");
            ApiError::from(e).into_response()
        }
    }
}

/// PUT `/account-types/{id}` - Update an account type.
async fn update_account_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateAccountTypeRequest>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());
    let input = UpdateAccountTypeInput {
        type_name: payload.type_name,
        description: payload.description,
    };

    match repo.update_account_type(AccountTypeId::from_uuid(id), input).await {
        Ok(updated) => {
            info!(account_type_id = %id, "Account type updated");
            success(
                StatusCode::OK,
                "Account type updated successfully",
                "accountType",
                AccountTypeResponse::from(updated),
            )
        }
        Err(e) => {
            error!(error = %e, account_type_id = %id, "Failed to update account type");
            ApiError::from(e).into_response()
        }
    }
}

/// DELETE `/account-types/{id}` - Delete an unused account type.
async fn delete_account_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo.delete_account_type(AccountTypeId::from_uuid(id)).await {
        Ok(()) => {
            info!(account_type_id = %id, "Account type deleted");
            success(StatusCode::OK, "Account type deleted successfully", "id", id)
        }
        Err(e) => {
            error!(error = %e, account_type_id = %id, "Failed to delete account type");
            ApiError::from(e).into_response()
        }
    }
}
