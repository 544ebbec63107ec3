//! Order Server - restaurant ordering core
//!
//! # Overview
//!
//! - **Orders** (`orders`): creation, bank-transfer payment, status workflow,
//!   ingredient consumption on completion
//! - **Inventory** (`inventory`): stock ledger and derived menu availability
//! - **Payment** (`payment`): adapter for the external bank service
//! - **Notifications** (`notify`): fire-and-forget real-time events
//! - **HTTP API** (`api`): REST endpoints and WebSocket rooms
//!
//! # Layout
//!
//! ```text
//! order-server/src/
//! ├── core/       # config, state, server, service errors
//! ├── api/        # HTTP routes and handlers
//! ├── db/         # SQLite pool and repositories
//! ├── inventory/  # stock ledger, availability
//! ├── orders/     # workflow, consumption, money
//! ├── payment/    # bank gateway
//! ├── notify/     # event bus
//! ├── sequence.rs # order labels and daily numbers
//! └── utils/      # logging, clock
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod inventory;
pub mod notify;
pub mod orders;
pub mod payment;
pub mod sequence;
pub mod utils;

pub use core::{Config, Server, ServerState, ServiceError, ServiceResult};
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use utils::logger::init_logger_with_file;

pub fn print_banner() {
    println!(
        r#"
  ___          _
 / _ \ _ __ __| | ___ _ __
| | | | '__/ _` |/ _ \ '__|
| |_| | | | (_| |  __/ |
 \___/|_|  \__,_|\___|_|
    "#
    );
}
