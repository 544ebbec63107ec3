//! Shared types for the ordering platform
//!
//! Domain models, the unified error system, real-time event payloads
//! and small utilities used by order-server and its clients.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::{Event, EventFrame, Room};
