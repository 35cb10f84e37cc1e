use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;

/// Errors that can short-circuit request handling before a
/// [`crate::sanitizer`] response body is assembled. These map directly
/// to the HTTP-visible error taxonomy; everything past normalization is
/// represented as a `Verdict` instead, never as this type.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),

    #[error("shutting down")]
    ShuttingDown,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        match self {
            GatewayError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, ()).into_response()
            }
            GatewayError::InvalidInput(reason) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "reason": reason })),
            )
                .into_response(),
            GatewayError::Internal(e) => {
                tracing::error!(error = %e, "unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "status": "error" })),
                )
                    .into_response()
            }
            GatewayError::ShuttingDown => {
                (StatusCode::SERVICE_UNAVAILABLE, ()).into_response()
            }
        }
    }
}
