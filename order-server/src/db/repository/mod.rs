//! Repository Module
//!
//! Typed handles over the SQLite pool. Each is constructed once at startup
//! and handed to the services that need it.

pub mod ingredient;
pub mod menu_item;
pub mod order;
pub mod sequence;

pub use ingredient::{IngredientRepository, StockMutation};
pub use menu_item::MenuItemRepository;
pub use order::{OrderRepository, PaymentClaim};
pub use sequence::SequenceRepository;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Database(format!("Corrupt JSON column: {err}"))
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::db::DbService;
    use sqlx::SqlitePool;

    pub async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }
}
