//! Data models
//!
//! Shared between order-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes. Wire format is camelCase.

pub mod ingredient;
pub mod menu_item;
pub mod order;

// Re-exports
pub use ingredient::*;
pub use menu_item::*;
pub use order::*;
