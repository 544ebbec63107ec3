use std::net::SocketAddr;
use std::sync::Arc;

use bank_mock::{Account, BankState, default_accounts};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank_mock=info,tower_http=info".into()),
        )
        .init();

    let port: u16 = std::env::var("BANK_MOCK_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4000);

    let accounts: Vec<Account> = match std::env::var("BANK_MOCK_ACCOUNTS") {
        Ok(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
            .map_err(|e| format!("BANK_MOCK_ACCOUNTS is not a valid account list: {e}"))?,
        _ => default_accounts(),
    };
    tracing::info!(accounts = accounts.len(), "Seeded bank accounts");

    let state = Arc::new(BankState::with_accounts(accounts));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Bank mock listening on {addr}");

    axum::serve(listener, bank_mock::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
