//! Stand-in for the external banking service
//!
//! Account directory, balances and transfers, kept in memory. Used for
//! local development and by order-server integration tests.

pub mod api;
pub mod state;

pub use api::router;
pub use state::{Account, BankState, Transaction, TransferError, default_accounts};

use std::net::SocketAddr;
use std::sync::Arc;

/// Serve the bank on `addr` in a background task. Returns the bound
/// address, so `127.0.0.1:0` picks a free port.
pub async fn spawn(state: Arc<BankState>, addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(state)).await {
            tracing::error!("Bank mock server error: {e}");
        }
    });
    Ok(local)
}
