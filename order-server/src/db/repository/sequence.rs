//! Daily Sequence Repository
//!
//! One counter row per calendar day, created lazily by the first order.

use super::RepoResult;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Atomically increment and return the counter for `order_date`.
    ///
    /// Single upsert statement: concurrent callers on the same day can never
    /// observe the same value.
    pub async fn next(&self, order_date: &str) -> RepoResult<i64> {
        let seq = sqlx::query_scalar::<_, i64>(
            "INSERT INTO daily_sequences (order_date, seq) VALUES (?1, 1)
             ON CONFLICT (order_date) DO UPDATE SET seq = seq + 1
             RETURNING seq",
        )
        .bind(order_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(seq)
    }
}
