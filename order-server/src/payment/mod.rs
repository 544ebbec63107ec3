//! Payment Gateway Adapter
//!
//! The workflow only sees [`PaymentGateway`]; [`BankTransferGateway`] speaks
//! the external bank's HTTP protocol. Failures are never retried here: the
//! order stays `pending` with the error recorded.

mod bank;

pub use bank::BankTransferGateway;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// A transfer from the customer's account to the restaurant
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub account_number: String,
    pub account_name: String,
    pub amount: f64,
    /// Human-readable order label, used in the transfer description
    pub order_ref: String,
}

/// Confirmed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    /// Customer balance after the transfer, if the bank reported it
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentFailure {
    #[error("Bank account {account_number} not found")]
    AccountNotFound { account_number: String },

    #[error("Insufficient funds: available {available:.2}, required {required:.2}")]
    InsufficientFunds { available: f64, required: f64 },

    #[error("Payment service unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("Payment service error ({status}): {message}")]
    GatewayServerError { status: u16, message: String },

    #[error("Payment rejected: {0}")]
    GatewayValidationError(String),

    #[error("Payment failed: {0}")]
    Unknown(String),
}

impl PaymentFailure {
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentFailure::AccountNotFound { .. } => ErrorCode::PaymentAccountNotFound,
            PaymentFailure::InsufficientFunds { .. } => ErrorCode::PaymentInsufficientFunds,
            PaymentFailure::GatewayUnavailable(_) => ErrorCode::PaymentGatewayUnavailable,
            PaymentFailure::GatewayServerError { .. } => ErrorCode::PaymentGatewayServerError,
            PaymentFailure::GatewayValidationError(_) => ErrorCode::PaymentGatewayRejected,
            PaymentFailure::Unknown(_) => ErrorCode::PaymentUnknownError,
        }
    }
}

impl From<&PaymentFailure> for AppError {
    fn from(failure: &PaymentFailure) -> Self {
        let err = AppError::with_message(failure.code(), failure.to_string());
        match failure {
            PaymentFailure::InsufficientFunds {
                available,
                required,
            } => err
                .with_detail("available", *available)
                .with_detail("required", *required),
            PaymentFailure::AccountNotFound { account_number } => {
                err.with_detail("accountNumber", account_number.clone())
            }
            _ => err,
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn process_payment(&self, request: &ChargeRequest)
    -> Result<PaymentReceipt, PaymentFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message_and_details() {
        let failure = PaymentFailure::InsufficientFunds {
            available: 20.0,
            required: 250.0,
        };
        assert_eq!(
            failure.to_string(),
            "Insufficient funds: available 20.00, required 250.00"
        );

        let err = AppError::from(&failure);
        assert_eq!(err.code, ErrorCode::PaymentInsufficientFunds);
        let details = err.details.unwrap();
        assert_eq!(details["available"], 20.0);
        assert_eq!(details["required"], 250.0);
    }

    #[test]
    fn test_failure_codes() {
        assert_eq!(
            PaymentFailure::AccountNotFound {
                account_number: "1".into()
            }
            .code()
            .code(),
            5101
        );
        assert_eq!(PaymentFailure::GatewayUnavailable("x".into()).code().code(), 5103);
        assert_eq!(
            PaymentFailure::GatewayServerError {
                status: 500,
                message: "x".into()
            }
            .code()
            .code(),
            5104
        );
        assert_eq!(PaymentFailure::GatewayValidationError("x".into()).code().code(), 5105);
        assert_eq!(PaymentFailure::Unknown("x".into()).code().code(), 5199);
    }
}
