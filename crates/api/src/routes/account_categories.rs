//! Account category routes.
//!
//! Categories cross-cut account types and drive the received/paid report.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tally_core::directory::AccountCategory;
use tally_db::repositories::{
    CreateAccountCategoryInput, DirectoryRepository, UpdateAccountCategoryInput,
};
use tally_shared::types::AccountCategoryId;
use tracing::{error, info};
use uuid::Uuid;

use super::{nullable, success};
use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
};

/// Creates the account category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/account-categories",
            get(list_account_categories).post(create_account_category),
        )
        .route(
            "/account-categories/{id}",
            get(get_account_category)
                .put(update_account_category)
                .delete(delete_account_category),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateAccountCategoryRequest {
    /// Category name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Free-form label such as "received" or "paid".
    #[serde(rename = "type")]
    pub category_type: String,
}

/// Request body for updating a category.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountCategoryRequest {
    /// New name.
    pub name: Option<String>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    /// New label.
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// Response for a category.
#[derive(Debug, Serialize)]
pub struct AccountCategoryResponse {
    /// Category ID.
    pub id: Uuid,
    /// Category name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Category label.
    #[serde(rename = "type")]
    pub category_type: String,
}

impl From<AccountCategory> for AccountCategoryResponse {
    fn from(c: AccountCategory) -> Self {
        Self {
            id: c.id.into_inner(),
            name: c.name,
            description: c.description,
            category_type: c.category_type,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/account-categories` - List categories in creation order.
async fn list_account_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo.list_account_categories().await {
        Ok(categories) => {
            let data: Vec<AccountCategoryResponse> =
                categories.into_iter().map(Into::into).collect();
            success(
                StatusCode::OK,
                "Account categories retrieved successfully",
                "accountCategories",
                data,
            )
        }
        Err(e) => {
            error!(error = %e, "Failed to list account categories");
            ApiError::from(e).into_response()
        }
    }
}

/// POST `/account-categories` - Create a category.
async fn create_account_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<CreateAccountCategoryRequest>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());
    let input = CreateAccountCategoryInput {
        name: payload.name,
        description: payload.description,
        category_type: payload.category_type,
    };

    match repo.create_account_category(input).await {
        Ok(created) => {
            info!(account_category_id = %created.id, "Account category created");
            success(
                StatusCode::CREATED,
                "Account category created successfully",
                "accountCategory",
                AccountCategoryResponse::from(created),
            )
        }
        Err(e) => {
            error!(error = %e, "Failed to create account category");
            ApiError::from(e).into_response()
        }
    }
}

/// GET `/account-categories/{id}` - Get a category.
async fn get_account_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo.find_account_category(AccountCategoryId::from_uuid(id)).await {
        Ok(found) => success(
            StatusCode::OK,
            "Account category retrieved successfully",
            "accountCategory",
            AccountCategoryResponse::from(found),
        ),
        Err(e) => {
            error!(error = %e, account_category_id = %id, "Failed to get account category");
            ApiError::from(e).into_response()
        }
    }
}

/// PUT `/account-categories/{id}` - Update a category.
async fn update_account_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateAccountCategoryRequest>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());
    let input = UpdateAccountCategoryInput {
        name: payload.name,
        description: payload.description,
        category_type: payload.category_type,
    };

    match repo
        .update_account_category(AccountCategoryId::from_uuid(id), input)
        .await
    {
        Ok(updated) => {
            info!(account_category_id = %id, "Account category updated");
            success(
                StatusCode::OK,
                "Account category updated successfully",
                "accountCategory",
                AccountCategoryResponse::from(updated),
            )
        }
        Err(e) => {
            error!(error = %e, account_category_id = %id, "Failed to update account category");
            ApiError::from(e).into_response()
        }
    }
}

/// DELETE `/account-categories/{id}` - Delete a category no account uses.
async fn delete_account_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let repo = DirectoryRepository::new((*state.db).clone());

    match repo.delete_account_category(AccountCategoryId::from_uuid(id)).await {
        Ok(()) => {
            info!(account_category_id = %id, "Account category deleted");
            success(StatusCode::OK, "Account category deleted successfully", "id", id)
        }
        Err(e) => {
            error!(error = %e, account_category_id = %id, "Failed to delete account category");
            ApiError::from(e).into_response()
        }
    }
}
