use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    /// Validation and referential failures. Reported to the caller inside the
    /// success envelope, not via the HTTP status.
    #[error("{0}")]
    Invalid(String),

    /// The hosted-checkout provider rejected or failed a request.
    #[error("Payment error: {0}")]
    Payment(String),

    /// Webhook signature could not be verified; rejected before any state access.
    #[error("Webhook Error: {0}")]
    WebhookSignature(String),

    /// The webhook event was valid but the post-payment update failed.
    #[error("Failed to update order or clear cart")]
    WebhookUpdate(#[source] anyhow::Error),

    #[error("Database error")]
    Db(#[from] sqlx::Error),

    #[error("Database error")]
    Orm(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                axum::Json(serde_json::json!({ "success": false, "message": message })),
            )
                .into_response(),
            AppError::WebhookSignature(_) => (
                StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({ "success": false, "message": message })),
            )
                .into_response(),
            AppError::WebhookUpdate(err) => {
                tracing::error!(error = %err, "webhook post-payment update failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(serde_json::json!({ "received": true, "message": message })),
                )
                    .into_response()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(serde_json::json!({ "success": false, "message": message })),
                )
                    .into_response()
            }
            AppError::Db(_) | AppError::Orm(_) | AppError::Invalid(_) | AppError::Payment(_) => (
                // Failures the storefront surfaces to the shopper keep HTTP 200
                // and report through the envelope.
                StatusCode::OK,
                axum::Json(serde_json::json!({ "success": false, "message": message })),
            )
                .into_response(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
