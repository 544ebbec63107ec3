//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::IngredientNotFound
            | Self::MenuItemNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderAlreadyPaid
            | Self::OrderAlreadyCompleted
            | Self::OrderAlreadyCancelled
            | Self::OrderInvalidTransition
            | Self::PaymentInProgress
            | Self::IngredientNameExists
            | Self::IngredientInUse => StatusCode::CONFLICT,

            // 402 Payment Required
            Self::PaymentInsufficientFunds | Self::PaymentFailed => StatusCode::PAYMENT_REQUIRED,

            // 502 Bad Gateway (bank answered, but not with a usable result)
            Self::PaymentGatewayServerError | Self::PaymentUnknownError => {
                StatusCode::BAD_GATEWAY
            }

            // 503 Service Unavailable (transient errors, client can retry)
            Self::PaymentGatewayUnavailable | Self::NetworkError | Self::TimeoutError => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
