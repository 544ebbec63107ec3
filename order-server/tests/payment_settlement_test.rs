//! Payment attempts that outlive, outrun or crash their request

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{line, order, state_with_gateway};
use order_server::AppError;
use order_server::payment::{ChargeRequest, PaymentFailure, PaymentGateway, PaymentReceipt};
use shared::error::ErrorCode;
use shared::models::{BankDetails, OrderStatus, PaymentRequest};

/// Answers every charge with `failure` after `delay`
struct SlowGateway {
    delay: Duration,
    failure: PaymentFailure,
}

#[async_trait]
impl PaymentGateway for SlowGateway {
    async fn process_payment(
        &self,
        _request: &ChargeRequest,
    ) -> Result<PaymentReceipt, PaymentFailure> {
        tokio::time::sleep(self.delay).await;
        Err(self.failure.clone())
    }
}

struct PanickingGateway;

#[async_trait]
impl PaymentGateway for PanickingGateway {
    async fn process_payment(
        &self,
        _request: &ChargeRequest,
    ) -> Result<PaymentReceipt, PaymentFailure> {
        panic!("gateway crashed");
    }
}

fn declined() -> PaymentFailure {
    PaymentFailure::InsufficientFunds {
        available: 5.0,
        required: 30.0,
    }
}

fn pay() -> PaymentRequest {
    PaymentRequest {
        bank_details: BankDetails {
            account_number: "1234567890".into(),
            account_name: "Alice Nguyen".into(),
            bank_name: None,
        },
    }
}

#[tokio::test]
async fn test_dropped_request_still_records_outcome() {
    let gateway = SlowGateway {
        delay: Duration::from_millis(500),
        failure: declined(),
    };
    let state = state_with_gateway(Arc::new(gateway), 2_000).await;
    let created = state
        .orders
        .create_order(order(vec![line(None, "Steak", 30.0, 1)]))
        .await
        .unwrap();

    // Client goes away while the bank is still answering
    let request = tokio::spawn({
        let orders = state.orders.clone();
        let id = created.id;
        async move { orders.submit_payment(id, pay()).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    request.abort();
    assert!(request.await.unwrap_err().is_cancelled());

    tokio::time::sleep(Duration::from_millis(700)).await;
    let settled = state.orders.get_order(created.id).await.unwrap();
    assert_eq!(settled.payment_attempts, 1);
    assert!(settled.payment_error.is_some());
    assert_eq!(settled.order_status, OrderStatus::Pending);

    // The claim is free again: a retry runs and the order can be cancelled
    let retry = state.orders.submit_payment(created.id, pay()).await.unwrap();
    assert!(matches!(
        retry.failure,
        Some(PaymentFailure::InsufficientFunds { .. })
    ));
    assert_eq!(retry.order.payment_attempts, 2);

    let cancelled = state
        .orders
        .update_status(created.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.order_status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_hanging_bank_times_out_as_unavailable() {
    let gateway = SlowGateway {
        delay: Duration::from_secs(60),
        failure: declined(),
    };
    // Attempts are bounded at 200ms
    let state = state_with_gateway(Arc::new(gateway), 100).await;
    let created = state
        .orders
        .create_order(order(vec![line(None, "Steak", 30.0, 1)]))
        .await
        .unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        state.orders.submit_payment(created.id, pay()),
    )
    .await
    .expect("workflow must bound the bank call")
    .unwrap();

    match outcome.failure {
        Some(PaymentFailure::GatewayUnavailable(detail)) => assert!(detail.contains("timed out")),
        other => panic!("unexpected failure {other:?}"),
    }
    assert_eq!(outcome.order.order_status, OrderStatus::Pending);
    assert!(!outcome.order.is_paid);
    assert!(outcome.order.payment_error.is_some());

    let cancelled = state
        .orders
        .update_status(created.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.order_status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_crashed_attempt_releases_claim() {
    let state = state_with_gateway(Arc::new(PanickingGateway), 2_000).await;
    let created = state
        .orders
        .create_order(order(vec![line(None, "Steak", 30.0, 1)]))
        .await
        .unwrap();

    let err: AppError = state
        .orders
        .submit_payment(created.id, pay())
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::InternalError);

    let order = state.orders.get_order(created.id).await.unwrap();
    assert_eq!(order.payment_attempts, 1);
    assert!(!order.is_paid);

    let cancelled = state
        .orders
        .update_status(created.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.order_status, OrderStatus::Cancelled);
}
