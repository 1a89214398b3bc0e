use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::app_error::AppError;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::AlreadyClaimed | AppError::NothingToRevoke => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotEligible | AppError::NotApproved => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PoolExhausted => StatusCode::SERVICE_UNAVAILABLE,
            AppError::EmailDelivery(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller. Server-side detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::Conflict(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::NotEligible => {
                "This email is not on the eligible attendee list".to_string()
            }
            AppError::NotApproved => "Your registration has not been approved yet".to_string(),
            AppError::PoolExhausted => "No credits available at the moment".to_string(),
            AppError::AlreadyClaimed => "User already has a credit assigned".to_string(),
            AppError::NothingToRevoke => "User has no credit to revoke".to_string(),
            AppError::InvalidCredentials => "Invalid username or password".to_string(),
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::EmailDelivery(_) => "Failed to send email".to_string(),
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Log the error before it gets converted into a status response.
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.public_message(),
            "code": self.code().as_str(),
        });
        (status, Json(body)).into_response()
    }
}
