//! HTTP client for the external bank service
//!
//! Protocol per charge:
//! 1. `GET {base}/accounts`, find the customer account
//! 2. compare its balance with the amount
//! 3. `POST {base}/transfer` to the restaurant account
//! 4. success only on `{"message": "Transfer successful", ...}`

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChargeRequest, PaymentFailure, PaymentGateway, PaymentReceipt};

const TRANSFER_SUCCESS: &str = "Transfer successful";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankAccount {
    account_number: String,
    #[serde(default)]
    account_name: Option<String>,
    balance: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferRequest<'a> {
    from_account_number: &'a str,
    to_account_number: &'a str,
    amount: f64,
    description: String,
}

#[derive(Clone)]
pub struct BankTransferGateway {
    client: reqwest::Client,
    base_url: String,
    restaurant_account: String,
}

impl BankTransferGateway {
    pub fn new(
        base_url: impl Into<String>,
        restaurant_account: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            restaurant_account: restaurant_account.into(),
        })
    }

    async fn find_account(&self, account_number: &str) -> Result<BankAccount, PaymentFailure> {
        let resp = self
            .client
            .get(format!("{}/accounts", self.base_url))
            .send()
            .await
            .map_err(transport_failure)?;
        let body = read_body(resp).await?;

        let accounts: Vec<BankAccount> = serde_json::from_value(body).map_err(|e| {
            PaymentFailure::Unknown(format!("Unexpected account directory response: {e}"))
        })?;

        accounts
            .into_iter()
            .find(|a| a.account_number == account_number)
            .ok_or_else(|| PaymentFailure::AccountNotFound {
                account_number: account_number.to_string(),
            })
    }

    async fn transfer(&self, request: &ChargeRequest) -> Result<PaymentReceipt, PaymentFailure> {
        let resp = self
            .client
            .post(format!("{}/transfer", self.base_url))
            .json(&TransferRequest {
                from_account_number: &request.account_number,
                to_account_number: &self.restaurant_account,
                amount: request.amount,
                description: format!("Payment for order {}", request.order_ref),
            })
            .send()
            .await
            .map_err(transport_failure)?;
        let body = read_body(resp).await?;

        let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
        if message != TRANSFER_SUCCESS {
            let raw = if message.is_empty() {
                body.to_string()
            } else {
                message.to_string()
            };
            return Err(PaymentFailure::Unknown(raw));
        }

        let transaction_id = match body.pointer("/transaction/id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                let generated = format!("TXN-{}", uuid::Uuid::new_v4());
                tracing::warn!(
                    order_ref = %request.order_ref,
                    transaction_id = %generated,
                    "Bank confirmed transfer without a transaction id, generated one locally"
                );
                generated
            }
        };

        Ok(PaymentReceipt {
            transaction_id,
            balance: body.get("balance").and_then(Value::as_f64),
        })
    }
}

#[async_trait]
impl PaymentGateway for BankTransferGateway {
    async fn process_payment(
        &self,
        request: &ChargeRequest,
    ) -> Result<PaymentReceipt, PaymentFailure> {
        let account = self.find_account(&request.account_number).await?;
        let name_matches = account
            .account_name
            .as_deref()
            .is_none_or(|name| name.eq_ignore_ascii_case(request.account_name.trim()));
        if !name_matches {
            tracing::debug!(
                account_number = %request.account_number,
                "Account name differs from the bank's record"
            );
        }

        if account.balance < request.amount {
            return Err(PaymentFailure::InsufficientFunds {
                available: account.balance,
                required: request.amount,
            });
        }

        self.transfer(request).await
    }
}

fn transport_failure(e: reqwest::Error) -> PaymentFailure {
    if e.is_timeout() {
        PaymentFailure::GatewayUnavailable("request timed out".into())
    } else if e.is_connect() {
        PaymentFailure::GatewayUnavailable(format!("connection failed: {e}"))
    } else if e.is_decode() {
        PaymentFailure::Unknown(format!("invalid response: {e}"))
    } else {
        PaymentFailure::GatewayUnavailable(e.to_string())
    }
}

/// Classify the HTTP status and return the JSON body of a 2xx response
async fn read_body(resp: reqwest::Response) -> Result<Value, PaymentFailure> {
    let status = resp.status();
    let text = resp.text().await.map_err(transport_failure)?;
    let body: Option<Value> = serde_json::from_str(&text).ok();

    if status.is_success() {
        return body.ok_or_else(|| PaymentFailure::Unknown(format!("non-JSON response: {text}")));
    }

    let detail = body
        .as_ref()
        .and_then(|b| {
            b.get("message")
                .or_else(|| b.get("error"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .unwrap_or(text);

    if status.is_server_error() {
        Err(PaymentFailure::GatewayServerError {
            status: status.as_u16(),
            message: detail,
        })
    } else if status.is_client_error() {
        Err(PaymentFailure::GatewayValidationError(detail))
    } else {
        Err(PaymentFailure::Unknown(format!("{status}: {detail}")))
    }
}
