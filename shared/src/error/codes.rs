//! Unified error codes for the ordering platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Inventory and menu errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the storefront and admin clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order has been cancelled
    OrderAlreadyCancelled = 4004,
    /// Order is empty
    OrderEmpty = 4007,
    /// Recomputed order total is not positive
    OrderInvalidTotal = 4008,
    /// Status change not allowed from the current status
    OrderInvalidTransition = 4009,
    /// Another payment attempt for this order is still running
    PaymentInProgress = 4010,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Customer account not found at the bank
    PaymentAccountNotFound = 5101,
    /// Customer account balance lower than the order total
    PaymentInsufficientFunds = 5102,
    /// Bank service unreachable or timed out
    PaymentGatewayUnavailable = 5103,
    /// Bank service answered with a server error
    PaymentGatewayServerError = 5104,
    /// Bank service rejected the request
    PaymentGatewayRejected = 5105,
    /// Unclassified payment failure
    PaymentUnknownError = 5199,

    // ==================== 6xxx: Inventory ====================
    /// Ingredient not found
    IngredientNotFound = 6001,
    /// Ingredient name already exists
    IngredientNameExists = 6002,
    /// Ingredient is referenced by a recipe
    IngredientInUse = 6003,
    /// Stock quantity is invalid
    InvalidStockQuantity = 6004,
    /// Menu item not found
    MenuItemNotFound = 6101,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderAlreadyCancelled => "Order has been cancelled",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderInvalidTotal => "Order total must be greater than zero",
            ErrorCode::OrderInvalidTransition => "Order status change is not allowed",
            ErrorCode::PaymentInProgress => "A payment for this order is already in progress",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentAccountNotFound => "Bank account not found",
            ErrorCode::PaymentInsufficientFunds => "Insufficient account balance",
            ErrorCode::PaymentGatewayUnavailable => "Payment service is unavailable",
            ErrorCode::PaymentGatewayServerError => "Payment service error",
            ErrorCode::PaymentGatewayRejected => "Payment request was rejected",
            ErrorCode::PaymentUnknownError => "Unknown payment error",

            // Inventory
            ErrorCode::IngredientNotFound => "Ingredient not found",
            ErrorCode::IngredientNameExists => "Ingredient name already exists",
            ErrorCode::IngredientInUse => "Ingredient is used by a menu item recipe",
            ErrorCode::InvalidStockQuantity => "Invalid stock quantity",
            ErrorCode::MenuItemNotFound => "Menu item not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderAlreadyCompleted),
            4004 => Ok(ErrorCode::OrderAlreadyCancelled),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidTotal),
            4009 => Ok(ErrorCode::OrderInvalidTransition),
            4010 => Ok(ErrorCode::PaymentInProgress),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5101 => Ok(ErrorCode::PaymentAccountNotFound),
            5102 => Ok(ErrorCode::PaymentInsufficientFunds),
            5103 => Ok(ErrorCode::PaymentGatewayUnavailable),
            5104 => Ok(ErrorCode::PaymentGatewayServerError),
            5105 => Ok(ErrorCode::PaymentGatewayRejected),
            5199 => Ok(ErrorCode::PaymentUnknownError),

            // Inventory
            6001 => Ok(ErrorCode::IngredientNotFound),
            6002 => Ok(ErrorCode::IngredientNameExists),
            6003 => Ok(ErrorCode::IngredientInUse),
            6004 => Ok(ErrorCode::InvalidStockQuantity),
            6101 => Ok(ErrorCode::MenuItemNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::OrderInvalidTotal.code(), 4008);
        assert_eq!(ErrorCode::PaymentAccountNotFound.code(), 5101);
        assert_eq!(ErrorCode::PaymentInsufficientFunds.code(), 5102);
        assert_eq!(ErrorCode::PaymentUnknownError.code(), 5199);
        assert_eq!(ErrorCode::IngredientNotFound.code(), 6001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::OrderAlreadyPaid,
            ErrorCode::PaymentGatewayRejected,
            ErrorCode::IngredientInUse,
            ErrorCode::ConfigError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::PaymentInsufficientFunds).unwrap();
        assert_eq!(json, "5102");
        let code: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(code, ErrorCode::OrderNotFound);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::PaymentFailed.is_success());
    }
}
