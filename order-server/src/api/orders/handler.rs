//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{Order, OrderCreate, OrderListQuery, OrderTracking, PaymentRequest, StatusUpdate};

use crate::core::ServerState;

/// POST /api/orders - place an order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = state.orders.create_order(payload).await?;
    Ok(Json(order))
}

/// GET /api/orders - admin listing, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.list_orders(&query).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.orders.get_order(id).await?;
    Ok(Json(order))
}

/// POST /api/orders/:id/payment
///
/// A declined payment answers with the payment error code and still
/// carries the updated order in `data`.
pub async fn submit_payment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Response> {
    let outcome = state.orders.submit_payment(id, payload).await?;
    Ok(match outcome.failure {
        None => Json(outcome.order).into_response(),
        Some(failure) => {
            ApiResponse::failure_with_data(&AppError::from(&failure), outcome.order).into_response()
        }
    })
}

/// PUT /api/orders/:id/status - admin status change
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<Order>> {
    let order = state.orders.update_status(id, payload.status).await?;
    Ok(Json(order))
}

/// GET /api/orders/track/:daily_number - public, today only
pub async fn track(
    State(state): State<ServerState>,
    Path(daily_number): Path<i64>,
) -> AppResult<Json<OrderTracking>> {
    let tracking = state.orders.track_by_daily_number(daily_number).await?;
    Ok(Json(tracking))
}
