//! Core module: configuration, state, server and service errors
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - injected components shared by handlers
//! - [`Server`] - HTTP server
//! - [`ServiceError`] - service-layer error

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use server::Server;
pub use state::ServerState;
