use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::DebtError;

impl IntoResponse for DebtError {
    fn into_response(self) -> Response {
        match self {
            DebtError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "validation failed", "issues": errors.issues })),
            )
                .into_response(),
            DebtError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "debt not found", "id": id })),
            )
                .into_response(),
            DebtError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}
