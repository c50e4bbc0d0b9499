//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tally_shared::AppError;
use tracing::error;

use crate::{ApiError, AppState, middleware::auth_middleware};

pub mod account_categories;
pub mod account_sub_types;
pub mod account_types;
pub mod accounts;
pub mod health;
pub mod ledgers;
pub mod reports;
pub mod transactions;

/// Creates the API router. Everything except `/health` requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(account_types::routes())
        .merge(account_sub_types::routes())
        .merge(account_categories::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(ledgers::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(health::routes()).merge(protected_routes)
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Success envelope: `{"success": true, "message": .., <key>: data}`.
pub(crate) fn success<T: serde::Serialize>(
    status: StatusCode,
    message: &str,
    key: &str,
    data: T,
) -> Response {
    success_with(status, message, [(key, serde_json::to_value(data))])
}

/// Success envelope carrying several top-level payload fields.
///
/// A payload that fails to serialize turns the whole response into an opaque 500.
pub(crate) fn success_with<const N: usize>(
    status: StatusCode,
    message: &str,
    fields: [(&str, serde_json::Result<Value>); N],
) -> Response {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert("message".to_string(), Value::String(message.to_string()));

    for (key, value) in fields {
        match value {
            Ok(value) => {
                body.insert(key.to_string(), value);
            }
            Err(e) => {
                error!(error = %e, field = key, "Failed to serialize response payload");
                return ApiError::from(AppError::Internal(e.to_string())).into_response();
            }
        }
    }

    (status, Json(Value::Object(body))).into_response()
}

/// Deserializes a field that distinguishes "absent" from explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_wraps_payload_under_key() {
        let response = success(StatusCode::CREATED, "Created", "id", "abc");

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Created");
        assert_eq!(body["id"], "abc");
    }

    #[tokio::test]
    async fn test_unserializable_payload_is_opaque_server_error() {
        // JSON object keys must be strings.
        let payload: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);

        let response = success(StatusCode::OK, "Report generated", "reportData", payload);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "Internal server error");
    }
}
