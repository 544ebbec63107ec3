//! Order Workflow Engine
//!
//! ```text
//! pending ──payment──▶ preparing ──admin──▶ completed
//!    │                     │
//!    └──────admin──────────┴──────admin──▶ cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Only the request that wins the
//! `preparing → completed` compare-and-set runs ingredient consumption, so a
//! duplicate completion can never deduct stock twice.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::message::{Event, OrderUpdatePayload, Room};
use shared::models::{
    BankDetails, Order, OrderCreate, OrderItem, OrderListQuery, OrderStatus, OrderTracking,
    PaymentRequest,
};

use super::consumption::ConsumptionProcess;
use super::money::{order_total, to_f64, validate_line};
use crate::core::{ServiceError, ServiceResult};
use crate::db::repository::{OrderRepository, PaymentClaim};
use crate::notify::SharedNotifier;
use crate::payment::{ChargeRequest, PaymentFailure, PaymentGateway};
use crate::sequence::SequenceAllocator;
use crate::utils::{Clock, date_key};

/// Result of a payment submission. A declined payment is not an error: the
/// order is persisted with `paymentError` and returned alongside the failure.
#[derive(Debug)]
pub struct PaymentOutcome {
    pub order: Order,
    pub failure: Option<PaymentFailure>,
}

#[derive(Clone)]
pub struct OrderWorkflow {
    orders: OrderRepository,
    sequence: SequenceAllocator,
    gateway: Arc<dyn PaymentGateway>,
    consumption: ConsumptionProcess,
    notifier: SharedNotifier,
    clock: Arc<dyn Clock>,
    payment_timeout: Duration,
}

impl OrderWorkflow {
    pub fn new(
        orders: OrderRepository,
        sequence: SequenceAllocator,
        gateway: Arc<dyn PaymentGateway>,
        consumption: ConsumptionProcess,
        notifier: SharedNotifier,
        clock: Arc<dyn Clock>,
        payment_timeout: Duration,
    ) -> Self {
        Self {
            orders,
            sequence,
            gateway,
            consumption,
            notifier,
            clock,
            payment_timeout,
        }
    }

    pub async fn create_order(&self, data: OrderCreate) -> ServiceResult<Order> {
        if data.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).into());
        }
        for (index, item) in data.items.iter().enumerate() {
            validate_line(index, item).map_err(AppError::validation)?;
        }
        if data.contact.name.trim().is_empty() {
            return Err(AppError::validation("Contact name is required").into());
        }

        let items: Vec<OrderItem> = data
            .items
            .into_iter()
            .map(|item| OrderItem {
                menu_item_id: item.id,
                name: item.name.trim().to_string(),
                unit_price: item.price,
                quantity: item.qty,
            })
            .collect();
        let total = order_total(&items);

        let ids = self.sequence.allocate().await?;
        let now = self.clock.now_millis();
        let order = Order {
            id: shared::util::snowflake_id(),
            order_id: ids.order_id,
            daily_order_number: ids.daily_order_number,
            order_date: ids.order_date,
            items,
            contact: data.contact,
            bank_details: None,
            total_price: to_f64(total),
            is_paid: false,
            paid_at: None,
            transaction_id: None,
            payment_error: None,
            payment_attempts: 0,
            order_status: OrderStatus::Pending,
            ingredient_consumption: Vec::new(),
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.orders.insert(&order).await?;

        tracing::info!(
            order_id = order.id,
            order_label = %order.order_id,
            daily_number = order.daily_order_number,
            total = order.total_price,
            "Order created"
        );
        Ok(order)
    }

    pub async fn get_order(&self, id: i64) -> ServiceResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| order_not_found(id))
    }

    pub async fn list_orders(&self, query: &OrderListQuery) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list(query).await?)
    }

    /// Charge the order's total to the customer's bank account.
    ///
    /// The amount is always recomputed from the stored line items.
    pub async fn submit_payment(
        &self,
        id: i64,
        request: PaymentRequest,
    ) -> ServiceResult<PaymentOutcome> {
        let bank_details = normalize_bank_details(request.bank_details)?;

        let order = self.get_order(id).await?;
        if order.is_paid {
            return Err(AppError::new(ErrorCode::OrderAlreadyPaid).into());
        }
        let total = order_total(&order.items);
        if total <= Decimal::ZERO {
            return Err(AppError::new(ErrorCode::OrderInvalidTotal).into());
        }
        let amount = to_f64(total);
        if (amount - order.total_price).abs() > 0.005 {
            tracing::warn!(
                order_id = id,
                stored = order.total_price,
                recomputed = amount,
                "Stored order total differs from line items, charging recomputed total"
            );
        }

        let order = match self.orders.claim_payment(id, self.clock.now_millis()).await? {
            PaymentClaim::Claimed(order) => order,
            PaymentClaim::NotFound => return Err(order_not_found(id)),
            PaymentClaim::AlreadyPaid(_) => {
                return Err(AppError::new(ErrorCode::OrderAlreadyPaid).into());
            }
            PaymentClaim::NotPayable(order) => return Err(terminal_error(order.order_status)),
            PaymentClaim::InProgress(_) => {
                return Err(AppError::new(ErrorCode::PaymentInProgress).into());
            }
        };

        // The bank exchange and its follow-up write run detached, so a
        // dropped request still records an outcome and frees the claim.
        let settle = tokio::spawn({
            let this = self.clone();
            async move { this.settle_payment(order, bank_details, amount).await }
        });
        match settle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(order_id = id, error = %e, "Payment task aborted");
                self.release_claim(id).await;
                Err(AppError::internal("Payment processing failed").into())
            }
        }
    }

    /// Run a claimed attempt against the bank and record the result
    async fn settle_payment(
        &self,
        order: Order,
        bank_details: BankDetails,
        amount: f64,
    ) -> ServiceResult<PaymentOutcome> {
        let id = order.id;
        tracing::info!(
            order_id = id,
            attempt = order.payment_attempts,
            amount,
            "Submitting payment"
        );
        let charge = ChargeRequest {
            account_number: bank_details.account_number.clone(),
            account_name: bank_details.account_name.clone(),
            amount,
            order_ref: order.order_id.clone(),
        };
        let result =
            match tokio::time::timeout(self.payment_timeout, self.gateway.process_payment(&charge))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(PaymentFailure::GatewayUnavailable(
                    "payment request timed out".into(),
                )),
            };

        match result {
            Ok(receipt) => {
                let paid_at = self.clock.now_millis();
                let updated = self
                    .orders
                    .complete_payment(id, &bank_details, &receipt.transaction_id, amount, paid_at)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            order_id = id,
                            transaction_id = %receipt.transaction_id,
                            amount,
                            error = %e,
                            "Bank transfer succeeded but the order could not be updated, manual review required"
                        );
                        ServiceError::from(e)
                    })?
                    .ok_or_else(|| order_not_found(id))?;

                tracing::info!(
                    order_id = id,
                    transaction_id = %receipt.transaction_id,
                    "Payment succeeded"
                );
                self.notify(&updated, updated.order_status.status_message().to_string());
                Ok(PaymentOutcome {
                    order: updated,
                    failure: None,
                })
            }
            Err(failure) => {
                let message = failure.to_string();
                tracing::warn!(order_id = id, error = %message, "Payment failed");
                let updated = match self
                    .orders
                    .fail_payment(id, &bank_details, &message, amount, self.clock.now_millis())
                    .await
                {
                    Ok(updated) => updated.ok_or_else(|| order_not_found(id))?,
                    Err(e) => {
                        self.release_claim(id).await;
                        return Err(e.into());
                    }
                };

                self.notify(&updated, message);
                Ok(PaymentOutcome {
                    order: updated,
                    failure: Some(failure),
                })
            }
        }
    }

    async fn release_claim(&self, id: i64) {
        if let Err(e) = self.orders.release_payment_claim(id).await {
            tracing::error!(
                order_id = id,
                error = %e,
                "Failed to release payment claim, it frees up on expiry"
            );
        }
    }

    /// Admin status change. Repeating the current status is a no-op that
    /// still re-announces it.
    pub async fn update_status(&self, id: i64, status: OrderStatus) -> ServiceResult<Order> {
        let order = self.get_order(id).await?;
        let current = order.order_status;

        if current == status {
            self.notify(&order, status.status_message().to_string());
            return Ok(order);
        }
        if current.is_terminal() {
            return Err(terminal_error(current));
        }
        if !current.admin_can_transition_to(status) {
            return Err(invalid_transition(current, status));
        }

        let now = self.clock.now_millis();
        if !self.orders.transition_status(id, current, status, now).await? {
            // Lost a race, or a payment attempt holds the order
            let latest = self.get_order(id).await?;
            if latest.order_status == status {
                self.notify(&latest, status.status_message().to_string());
                return Ok(latest);
            }
            if self.orders.is_payment_in_progress(id, now).await? {
                return Err(AppError::new(ErrorCode::PaymentInProgress).into());
            }
            return Err(invalid_transition(latest.order_status, status));
        }
        tracing::info!(order_id = id, from = %current, to = %status, "Order status updated");

        if status == OrderStatus::Completed {
            let records = self.consumption.run(&order).await;
            if let Err(e) = self
                .orders
                .store_consumption(id, &records, self.clock.now_millis())
                .await
            {
                tracing::error!(
                    order_id = id,
                    error = %e,
                    "Failed to store consumption records"
                );
            }
        }

        let updated = self.get_order(id).await?;
        self.notify(&updated, status.status_message().to_string());
        Ok(updated)
    }

    /// Public tracking by daily number, today only. Unknown and expired
    /// numbers are indistinguishable.
    pub async fn track_by_daily_number(&self, daily_order_number: i64) -> ServiceResult<OrderTracking> {
        let today = date_key(self.clock.today());
        let order = self
            .orders
            .find_by_daily_number(&today, daily_order_number)
            .await?
            .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::OrderNotFound)))?;
        Ok(OrderTracking {
            order_status: order.order_status,
            daily_order_number: order.daily_order_number,
        })
    }

    fn notify(&self, order: &Order, message: String) {
        self.notifier.publish(
            Room::Order(order.id),
            Event::OrderUpdate(OrderUpdatePayload {
                order_id: order.order_id.clone(),
                id: order.id,
                message,
                status: order.order_status,
                timestamp: self.clock.now_millis(),
            }),
        );
    }
}

fn normalize_bank_details(details: BankDetails) -> Result<BankDetails, AppError> {
    let account_number = details.account_number.trim().to_string();
    let account_name = details.account_name.trim().to_string();
    if account_number.is_empty() {
        return Err(AppError::validation("Bank account number is required"));
    }
    if account_name.is_empty() {
        return Err(AppError::validation("Bank account name is required"));
    }
    Ok(BankDetails {
        account_number,
        account_name,
        bank_name: details.bank_name,
    })
}

fn order_not_found(id: i64) -> ServiceError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found")).into()
}

fn terminal_error(status: OrderStatus) -> ServiceError {
    match status {
        OrderStatus::Cancelled => AppError::new(ErrorCode::OrderAlreadyCancelled).into(),
        OrderStatus::Completed => AppError::new(ErrorCode::OrderAlreadyCompleted).into(),
        other => AppError::with_message(
            ErrorCode::OrderInvalidTransition,
            format!("Order is {other}"),
        )
        .into(),
    }
}

fn invalid_transition(from: OrderStatus, to: OrderStatus) -> ServiceError {
    let message = if from == OrderStatus::Pending && to == OrderStatus::Preparing {
        "An order starts preparing only after payment".to_string()
    } else {
        format!("Cannot change order status from {from} to {to}")
    };
    AppError::with_message(ErrorCode::OrderInvalidTransition, message)
        .with_detail("from", from.as_str())
        .with_detail("to", to.as_str())
        .into()
}
