//! Account sub-type routes.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tally_core::directory::AccountSubType;
use tally_db::repositories::{
    CreateAccountSubTypeInput, DirectoryRepository, UpdateAccountSubTypeInput,
};
use tally_shared::types::{AccountSubTypeId, AccountTypeId};
use tracing::{error, info};
use uuid::Uuid;

use super::{nullable, success};
use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};

/// Creates the account sub-type routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/account-sub-types",
            get(list_account_sub_types).post(create_account_sub_type),
        )
        .route(
            "/account-sub-types/{id}",
            get(get_account_sub_type)
                .put(update_account_sub_type)
                .delete(delete_account_sub_type),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing sub-types.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountSubTypesQuery {
    /// Only sub-types of this account type.
    pub account_type_id: Option<Uuid>,
}

/// Request body for creating a sub-type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountSubTypeRequest {
    /// Sub-type name.
    pub sub_type_name: String,
    /// Owning account type.
    pub account_type_id: Uuid,
    /// Description.
    pub description: Option<String>,
}

/// Request body for updating a sub-type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountSubTypeRequest {
    /// New name.
    pub sub_type_name: Option<String>,
    /// New owning account type.
    pub account_type_id: Option<Uuid>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

/// Response for a sub-type.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSubTypeResponse {
    /// Sub-type ID.
    pub id: Uuid,
    /// Sub-type name.
    pub sub_type_name: String,
    /// Owning account type.
    pub account_type_id: Uuid,
    /// Description.
    pub description: Option<String>,
}

impl From<AccountSubType> for AccountSubTypeResponse {
    fn from(s: AccountSubType) -> Self {
        Self {
            id: s.id.into_inner(),
            sub_type_name: s.sub_type_name,
            account_type_id: s.account_type_id.into_inner(),
            description: s.description,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/account-sub-types` - List sub-types, optionally for one account type.
async fn list_account_sub_types(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ListAccountSubTypesQuery>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo
        .list_account_sub_types(query.account_type_id.map(AccountTypeId::from_uuid))
        .await
    {
        Ok(sub_types) => {
            let data: Vec<AccountSubTypeResponse> = sub_types.into_iter().map(Into::into).collect();
            success(
                StatusCode::OK,
                "Account sub-types retrieved successfully",
                "accountSubTypes",
                data,
            )
        }
        Err(e) => {
            error!(error = %e, "Failed to list account sub-types");
            ApiError::from(e).into_response()
        }
    }
}

/// POST `/account-sub-types` - Create a sub-type under an existing account type.
async fn create_account_sub_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<CreateAccountSubTypeRequest>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());
    let input = CreateAccountSubTypeInput {
        sub_type_name: payload.sub_type_name,
        account_type_id: AccountTypeId::from_uuid(payload.account_type_id),
        description: payload.description,
    };

    match repo.create_account_sub_type(input).await {
        Ok(created) => {
            info!(
                account_sub_type_id = %created.id,
                account_type_id = %created.account_type_id,
                "Account sub-type created"
            );
            success(
                StatusCode::CREATED,
                "Account sub-type created successfully",
                "accountSubType",
                AccountSubTypeResponse::from(created),
            )
        }
        Err(e) => {
            error!(error = %e, account_type_id = %payload.account_type_id, "Failed to create account sub-type");
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/account-sub-types/{id}` - Get a sub-type.
async fn get_account_sub_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo.find_account_sub_type(AccountSubTypeId::from_uuid(id)).await {
        Ok(found) => success(
            StatusCode::OK,
            "Account sub-type retrieved successfully",
            "accountSubType",
            AccountSubTypeResponse::from(found),
        ),
        Err(e) => {
            error!(error = %e, account_sub_type_id = %id, "Failed to get account sub-type");
            ApiError::from(e).into_response()
        }
    }
}

/// PUT `/account-sub-types/{id}` - Update a sub-type.
///
/// Moving a sub-type to another account type is refused while accounts use it.
async fn update_account_sub_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateAccountSubTypeRequest>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());
    let input = UpdateAccountSubTypeInput {
        sub_type_name: payload.sub_type_name,
        account_type_id: payload.account_type_id.map(AccountTypeId::from_uuid),
        description: payload.description,
    };

    match repo
        .update_account_sub_type(AccountSubTypeId::from_uuid(id), input)
        .await
    {
        Ok(updated) => {
            info!(account_sub_type_id = %id, "Account sub-type updated");
            success(
                StatusCode::OK,
                "Account sub-type updated successfully",
                "accountSubType",
                AccountSubTypeResponse::from(updated),
            )
        }
        Err(e) => {
            error!(error = %e, account_sub_type_id = %id, "Failed to update account sub-type");
            ApiError::from(e).into_response()
        }
    }
}

/// DELETE `/account-sub-types/{id}` - Delete an unused sub-type.
async fn delete_account_sub_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo.delete_account_sub_type(AccountSubTypeId::from_uuid(id)).await {
        Ok(()) => {
            info!(account_sub_type_id = %id, "Account sub-type deleted");
            success(StatusCode::OK, "Account sub-type deleted successfully", "id", id)
        }
        Err(e) => {
            error!(error = %e, account_sub_type_id = %id, "Failed to delete account sub-type");
            ApiError::from(e).into_response()
        }
    }
}
