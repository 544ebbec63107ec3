use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bank_mock::{BankState, default_accounts, router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn transfer(body: Value) -> Request<Body> {
    Request::post("/api/transfer")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_account_directory() {
    let app = router(Arc::new(BankState::with_accounts(default_accounts())));

    let (status, body) = call(
        app.clone(),
        Request::get("/api/accounts").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert!(body[0].get("accountNumber").is_some());

    let (status, body) = call(
        app.clone(),
        Request::get("/api/accounts/1234567890").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 1000.0);

    let (status, _) = call(
        app,
        Request::get("/api/accounts/0000").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transfer_contract() {
    let state = Arc::new(BankState::with_accounts(default_accounts()));
    let app = router(state.clone());

    let (status, body) = call(
        app.clone(),
        transfer(json!({
            "fromAccountNumber": "1234567890",
            "toAccountNumber": "9999999999",
            "amount": 120.5,
            "description": "Payment for order ORD1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Transfer successful");
    assert!(body["transaction"]["id"].as_str().unwrap().starts_with("TXN-"));
    assert_eq!(body["balance"], 879.5);

    let (status, body) = call(
        app.clone(),
        transfer(json!({
            "fromAccountNumber": "2345678901",
            "toAccountNumber": "9999999999",
            "amount": 500.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient funds");

    let (status, _) = call(
        app.clone(),
        transfer(json!({
            "fromAccountNumber": "404",
            "toAccountNumber": "9999999999",
            "amount": 1.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    state.set_outage(true);
    let (status, _) = call(
        app,
        transfer(json!({
            "fromAccountNumber": "1234567890",
            "toAccountNumber": "9999999999",
            "amount": 1.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(state.balance("9999999999").await, Some(120.5));
}
