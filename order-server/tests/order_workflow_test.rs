//! Order lifecycle against an in-process bank

mod common;

use common::{ALICE, BOB, dish, harness, ingredient, line, order};
use order_server::AppError;
use order_server::payment::PaymentFailure;
use shared::error::ErrorCode;
use shared::message::{Event, Room};
use shared::models::{
    BankDetails, ConsumptionStatus, OrderStatus, PaymentRequest, StockStatus,
};

fn pay(account: &str) -> PaymentRequest {
    PaymentRequest {
        bank_details: BankDetails {
            account_number: account.into(),
            account_name: "Alice Nguyen".into(),
            bank_name: Some("Mock Bank".into()),
        },
    }
}

#[tokio::test]
async fn test_create_order_computes_total_and_daily_number() {
    let h = harness().await;
    let first = h
        .state
        .orders
        .create_order(order(vec![
            line(None, "Pho", 100.0, 2),
            line(None, "Tea", 50.0, 1),
        ]))
        .await
        .unwrap();

    assert_eq!(first.total_price, 250.0);
    assert_eq!(first.daily_order_number, 1);
    assert_eq!(first.order_date, "2024-05-01");
    assert_eq!(first.order_id, "ORD20240501-1200PM");
    assert_eq!(first.order_status, OrderStatus::Pending);
    assert!(!first.is_paid);

    let second = h
        .state
        .orders
        .create_order(order(vec![line(None, "Tea", 50.0, 1)]))
        .await
        .unwrap();
    assert_eq!(second.daily_order_number, 2);
}

#[tokio::test]
async fn test_create_order_rejects_empty_and_invalid_lines() {
    let h = harness().await;
    let err: AppError = h
        .state
        .orders
        .create_order(order(vec![]))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderEmpty);

    let err: AppError = h
        .state
        .orders
        .create_order(order(vec![line(None, "Pho", -1.0, 1)]))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let err: AppError = h
        .state
        .orders
        .create_order(order(vec![line(None, "Pho", 10.0, 0)]))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn test_successful_payment_moves_to_preparing() {
    let h = harness().await;
    let mut events = h.state.events.subscribe();
    let created = h
        .state
        .orders
        .create_order(order(vec![
            line(None, "Pho", 100.0, 2),
            line(None, "Tea", 50.0, 1),
        ]))
        .await
        .unwrap();

    let outcome = h
        .state
        .orders
        .submit_payment(created.id, pay(ALICE))
        .await
        .unwrap();
    assert!(outcome.failure.is_none());
    let paid = outcome.order;
    assert!(paid.is_paid);
    assert!(paid.paid_at.is_some());
    assert_eq!(paid.order_status, OrderStatus::Preparing);
    assert!(paid.transaction_id.as_deref().unwrap().starts_with("TXN-"));
    assert_eq!(paid.payment_attempts, 1);
    assert!(paid.payment_error.is_none());

    assert_eq!(h.bank.balance(ALICE).await, Some(750.0));
    let transactions = h.bank.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(
        transactions[0].description,
        format!("Payment for order {}", created.order_id)
    );

    let frame = events.recv().await.unwrap();
    assert_eq!(frame.rooms, vec![Room::Order(created.id)]);
    match frame.event {
        Event::OrderUpdate(update) => assert_eq!(update.status, OrderStatus::Preparing),
        other => panic!("unexpected event {other:?}"),
    }

    // A second payment is refused and charges nothing
    let err: AppError = h
        .state
        .orders
        .submit_payment(created.id, pay(ALICE))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderAlreadyPaid);
    assert_eq!(h.bank.balance(ALICE).await, Some(750.0));
}

#[tokio::test]
async fn test_insufficient_funds_leaves_order_pending() {
    let h = harness().await;
    let created = h
        .state
        .orders
        .create_order(order(vec![line(None, "Pho", 100.0, 2), line(None, "Tea", 50.0, 1)]))
        .await
        .unwrap();

    let outcome = h
        .state
        .orders
        .submit_payment(created.id, pay(BOB))
        .await
        .unwrap();
    assert_eq!(
        outcome.failure,
        Some(PaymentFailure::InsufficientFunds {
            available: 20.0,
            required: 250.0
        })
    );
    let order = outcome.order;
    assert!(!order.is_paid);
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(
        order.payment_error.as_deref(),
        Some("Insufficient funds: available 20.00, required 250.00")
    );
    assert_eq!(order.payment_attempts, 1);
    assert_eq!(h.bank.balance(BOB).await, Some(20.0));

    // The customer can retry with another account
    let outcome = h
        .state
        .orders
        .submit_payment(created.id, pay(ALICE))
        .await
        .unwrap();
    assert!(outcome.failure.is_none());
    assert_eq!(outcome.order.payment_attempts, 2);
    assert!(outcome.order.payment_error.is_none());
}

#[tokio::test]
async fn test_payment_failure_taxonomy() {
    let h = harness().await;
    let created = h
        .state
        .orders
        .create_order(order(vec![line(None, "Pho", 10.0, 1)]))
        .await
        .unwrap();

    let outcome = h
        .state
        .orders
        .submit_payment(created.id, pay("0000000000"))
        .await
        .unwrap();
    assert!(matches!(
        outcome.failure,
        Some(PaymentFailure::AccountNotFound { .. })
    ));

    h.bank.set_outage(true);
    let outcome = h
        .state
        .orders
        .submit_payment(created.id, pay(ALICE))
        .await
        .unwrap();
    assert!(matches!(
        outcome.failure,
        Some(PaymentFailure::GatewayServerError { status: 503, .. })
    ));
    assert_eq!(outcome.order.order_status, OrderStatus::Pending);
    assert_eq!(h.bank.balance(ALICE).await, Some(1_000.0));
}

#[tokio::test]
async fn test_zero_total_and_unknown_order_are_rejected() {
    let h = harness().await;
    let free = h
        .state
        .orders
        .create_order(order(vec![line(None, "Water", 0.0, 1)]))
        .await
        .unwrap();

    let err: AppError = h
        .state
        .orders
        .submit_payment(free.id, pay(ALICE))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderInvalidTotal);
    let unchanged = h.state.orders.get_order(free.id).await.unwrap();
    assert_eq!(unchanged.payment_attempts, 0);

    let err: AppError = h
        .state
        .orders
        .submit_payment(424242, pay(ALICE))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn test_status_rules() {
    let h = harness().await;
    let created = h
        .state
        .orders
        .create_order(order(vec![line(None, "Pho", 10.0, 1)]))
        .await
        .unwrap();

    // Preparing only comes from payment
    let err: AppError = h
        .state
        .orders
        .update_status(created.id, OrderStatus::Preparing)
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderInvalidTransition);

    let err: AppError = h
        .state
        .orders
        .update_status(created.id, OrderStatus::Completed)
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderInvalidTransition);

    let cancelled = h
        .state
        .orders
        .update_status(created.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.order_status, OrderStatus::Cancelled);

    // Terminal
    let err: AppError = h
        .state
        .orders
        .update_status(created.id, OrderStatus::Completed)
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderAlreadyCancelled);

    let err: AppError = h
        .state
        .orders
        .submit_payment(created.id, pay(ALICE))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderAlreadyCancelled);

    let err: AppError = h
        .state
        .orders
        .update_status(777, OrderStatus::Cancelled)
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn test_completion_consumes_stock_exactly_once() {
    let h = harness().await;
    let beef = h
        .state
        .ledger
        .create_ingredient(ingredient("Beef", 10.0, 2.0))
        .await
        .unwrap();
    let noodles = h
        .state
        .ledger
        .create_ingredient(ingredient("Noodles", 5.0, 1.0))
        .await
        .unwrap();
    let pho = h
        .state
        .menu_items
        .create(dish("Pho", 12.0, &[(beef.id, 0.5), (noodles.id, 0.25)]), 1)
        .await
        .unwrap();

    let created = h
        .state
        .orders
        .create_order(order(vec![line(Some(pho.id), "Pho", 12.0, 4)]))
        .await
        .unwrap();
    h.state
        .orders
        .submit_payment(created.id, pay(ALICE))
        .await
        .unwrap();

    let completed = h
        .state
        .orders
        .update_status(created.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.order_status, OrderStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert_eq!(completed.ingredient_consumption.len(), 2);
    assert!(completed
        .ingredient_consumption
        .iter()
        .all(|r| r.status == ConsumptionStatus::Success));

    let beef_after = h.state.ledger.get_ingredient(beef.id).await.unwrap();
    assert_eq!(beef_after.current_stock, 8.0);
    let noodles_after = h.state.ledger.get_ingredient(noodles.id).await.unwrap();
    assert_eq!(noodles_after.current_stock, 4.0);

    // Duplicate completion is a no-op
    let again = h
        .state
        .orders
        .update_status(created.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(again.order_status, OrderStatus::Completed);
    let beef_again = h.state.ledger.get_ingredient(beef.id).await.unwrap();
    assert_eq!(beef_again.current_stock, 8.0);
}

#[tokio::test]
async fn test_completion_falls_back_to_name_and_skips_unknown_lines() {
    let h = harness().await;
    let rice = h
        .state
        .ledger
        .create_ingredient(ingredient("Rice", 1.0, 0.5))
        .await
        .unwrap();
    let fried_rice = h
        .state
        .menu_items
        .create(dish("Fried Rice", 8.0, &[(rice.id, 0.4)]), 1)
        .await
        .unwrap();

    let created = h
        .state
        .orders
        .create_order(order(vec![
            // Stale id, matching name
            line(Some(99), "Fried Rice", 8.0, 3),
            line(None, "Mystery Dish", 5.0, 1),
        ]))
        .await
        .unwrap();
    h.state
        .orders
        .submit_payment(created.id, pay(ALICE))
        .await
        .unwrap();

    let completed = h
        .state
        .orders
        .update_status(created.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.order_status, OrderStatus::Completed);

    let records = &completed.ingredient_consumption;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].menu_item_name, "Fried Rice");
    // 1.0 - 3 × 0.4 goes below zero: recorded, not blocked
    assert_eq!(records[0].status, ConsumptionStatus::Shortfall);
    assert_eq!(records[1].menu_item_name, "Mystery Dish");
    assert_eq!(records[1].status, ConsumptionStatus::Skipped);

    let rice_after = h.state.ledger.get_ingredient(rice.id).await.unwrap();
    assert_eq!(rice_after.stock_status, StockStatus::OutOfStock);
    let menu_item = h
        .state
        .menu_items
        .find_by_id(fried_rice.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!menu_item.is_available);
}

#[tokio::test]
async fn test_tracking_is_scoped_to_today() {
    let h = harness().await;
    for _ in 0..3 {
        h.state
            .orders
            .create_order(order(vec![line(None, "Tea", 2.0, 1)]))
            .await
            .unwrap();
    }

    let tracking = h.state.orders.track_by_daily_number(3).await.unwrap();
    assert_eq!(tracking.daily_order_number, 3);
    assert_eq!(tracking.order_status, OrderStatus::Pending);

    h.clock.advance(chrono::Duration::days(1));
    let err: AppError = h
        .state
        .orders
        .track_by_daily_number(3)
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
    assert_eq!(err.message, "Order not found");

    // Numbering restarts on the new day
    let next = h
        .state
        .orders
        .create_order(order(vec![line(None, "Tea", 2.0, 1)]))
        .await
        .unwrap();
    assert_eq!(next.daily_order_number, 1);
}
