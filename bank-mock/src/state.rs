//! In-memory account book

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: String,
    pub account_name: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    pub balance: f64,
}

impl Account {
    pub fn new(number: &str, name: &str, balance: f64) -> Self {
        Self {
            account_number: number.into(),
            account_name: name.into(),
            bank_name: Some("Mock Bank".into()),
            balance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub from_account_number: String,
    pub to_account_number: String,
    pub amount: f64,
    pub description: String,
    pub timestamp: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum TransferError {
    #[error("Account {0} not found")]
    AccountNotFound(String),
    #[error("Insufficient funds")]
    InsufficientFunds { balance: f64 },
    #[error("Invalid amount")]
    InvalidAmount,
}

/// Accounts the binary starts with when none are configured
pub fn default_accounts() -> Vec<Account> {
    vec![
        Account::new("9999999999", "Restaurant", 0.0),
        Account::new("1234567890", "Alice Nguyen", 1_000.0),
        Account::new("2345678901", "Bob Tran", 50.0),
    ]
}

#[derive(Debug, Default)]
pub struct BankState {
    accounts: Mutex<HashMap<String, Account>>,
    transactions: Mutex<Vec<Transaction>>,
    /// Answer every transfer with 503
    outage: AtomicBool,
}

impl BankState {
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|a| (a.account_number.clone(), a))
            .collect();
        Self {
            accounts: Mutex::new(accounts),
            ..Default::default()
        }
    }

    pub async fn list(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.lock().await.values().cloned().collect();
        accounts.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        accounts
    }

    pub async fn get(&self, number: &str) -> Option<Account> {
        self.accounts.lock().await.get(number).cloned()
    }

    pub async fn balance(&self, number: &str) -> Option<f64> {
        self.get(number).await.map(|a| a.balance)
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().await.clone()
    }

    pub fn set_outage(&self, outage: bool) {
        self.outage.store(outage, Ordering::SeqCst);
    }

    pub fn in_outage(&self) -> bool {
        self.outage.load(Ordering::SeqCst)
    }

    /// Move `amount` between two accounts. Returns the transaction and the
    /// sender's new balance.
    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: f64,
        description: &str,
    ) -> Result<(Transaction, f64), TransferError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TransferError::InvalidAmount);
        }

        let mut accounts = self.accounts.lock().await;
        if !accounts.contains_key(to) {
            return Err(TransferError::AccountNotFound(to.to_string()));
        }
        let sender = accounts
            .get_mut(from)
            .ok_or_else(|| TransferError::AccountNotFound(from.to_string()))?;
        if sender.balance < amount {
            return Err(TransferError::InsufficientFunds {
                balance: sender.balance,
            });
        }
        sender.balance = round_cents(sender.balance - amount);
        let sender_balance = sender.balance;

        if let Some(receiver) = accounts.get_mut(to) {
            receiver.balance = round_cents(receiver.balance + amount);
        }
        drop(accounts);

        let transaction = Transaction {
            id: format!("TXN-{}", uuid::Uuid::new_v4()),
            from_account_number: from.to_string(),
            to_account_number: to.to_string(),
            amount,
            description: description.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        self.transactions.lock().await.push(transaction.clone());
        tracing::info!(
            transaction_id = %transaction.id,
            from,
            to,
            amount,
            "Transfer completed"
        );
        Ok((transaction, sender_balance))
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transfer_moves_funds() {
        let bank = BankState::with_accounts(default_accounts());
        let (txn, balance) = bank
            .transfer("1234567890", "9999999999", 250.0, "Payment")
            .await
            .unwrap();
        assert_eq!(balance, 750.0);
        assert_eq!(txn.amount, 250.0);
        assert_eq!(bank.balance("9999999999").await, Some(250.0));
        assert_eq!(bank.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_transfer_errors() {
        let bank = BankState::with_accounts(default_accounts());
        assert_eq!(
            bank.transfer("2345678901", "9999999999", 60.0, "x").await.unwrap_err(),
            TransferError::InsufficientFunds { balance: 50.0 }
        );
        assert_eq!(
            bank.transfer("000", "9999999999", 1.0, "x").await.unwrap_err(),
            TransferError::AccountNotFound("000".into())
        );
        assert_eq!(
            bank.transfer("1234567890", "9999999999", -1.0, "x").await.unwrap_err(),
            TransferError::InvalidAmount
        );
        // Nothing moved
        assert_eq!(bank.balance("2345678901").await, Some(50.0));
        assert!(bank.transactions().await.is_empty());
    }
}
