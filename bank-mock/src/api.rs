use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::state::{BankState, TransferError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    from_account_number: String,
    to_account_number: String,
    amount: f64,
    #[serde(default)]
    description: String,
}

async fn list_accounts(State(state): State<Arc<BankState>>) -> Response {
    Json(state.list().await).into_response()
}

async fn get_account(State(state): State<Arc<BankState>>, Path(number): Path<String>) -> Response {
    match state.get(&number).await {
        Some(account) => Json(account).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Account not found" })),
        )
            .into_response(),
    }
}

async fn transfer(State(state): State<Arc<BankState>>, Json(req): Json<TransferRequest>) -> Response {
    if state.in_outage() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "Bank is under maintenance" })),
        )
            .into_response();
    }

    match state
        .transfer(
            &req.from_account_number,
            &req.to_account_number,
            req.amount,
            &req.description,
        )
        .await
    {
        Ok((transaction, balance)) => Json(json!({
            "message": "Transfer successful",
            "transaction": transaction,
            "balance": balance,
        }))
        .into_response(),
        Err(e) => {
            tracing::info!(error = %e, from = %req.from_account_number, "Transfer rejected");
            let (status, body) = match &e {
                TransferError::AccountNotFound(_) => {
                    (StatusCode::NOT_FOUND, json!({ "message": e.to_string() }))
                }
                TransferError::InsufficientFunds { balance } => (
                    StatusCode::BAD_REQUEST,
                    json!({ "message": e.to_string(), "balance": balance }),
                ),
                TransferError::InvalidAmount => {
                    (StatusCode::BAD_REQUEST, json!({ "message": e.to_string() }))
                }
            };
            (status, Json(body)).into_response()
        }
    }
}

pub fn router(state: Arc<BankState>) -> Router {
    Router::new()
        .route("/api/accounts", get(list_accounts))
        .route("/api/accounts/{number}", get(get_account))
        .route("/api/transfer", post(transfer))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
