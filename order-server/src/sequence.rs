//! Sequence Allocator
//!
//! Two identifiers per order:
//! - a human-readable label derived from the creation time (minute
//!   granularity, not unique)
//! - a per-day sequential number, unique within its calendar day

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::db::repository::{RepoResult, SequenceRepository};
use crate::utils::{Clock, date_key};

/// Identifiers issued to a new order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIdentifiers {
    pub order_id: String,
    pub order_date: String,
    pub daily_order_number: i64,
}

/// Human-readable order label, e.g. `ORD20240501-0130PM`
pub fn order_label(now: NaiveDateTime) -> String {
    now.format("ORD%Y%m%d-%I%M%p").to_string()
}

#[derive(Clone)]
pub struct SequenceAllocator {
    repo: SequenceRepository,
    clock: Arc<dyn Clock>,
}

impl SequenceAllocator {
    pub fn new(repo: SequenceRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn allocate_order_id(&self) -> String {
        order_label(self.clock.now())
    }

    /// Atomically increment and return the counter for `date`
    pub async fn allocate_daily_sequence(&self, date: NaiveDate) -> RepoResult<i64> {
        self.repo.next(&date_key(date)).await
    }

    /// Both identifiers for an order created now. Fails as a whole if the
    /// counter cannot be incremented.
    pub async fn allocate(&self) -> RepoResult<OrderIdentifiers> {
        let now = self.clock.now();
        let daily_order_number = self.allocate_daily_sequence(now.date()).await?;
        Ok(OrderIdentifiers {
            order_id: order_label(now),
            order_date: date_key(now.date()),
            daily_order_number,
        })
    }
}
