//! Order Repository
//!
//! Orders are documents: line items, contact, bank details and consumption
//! records live in JSON columns. Status and payment changes are
//! compare-and-set updates so concurrent requests cannot both win.

use super::{RepoError, RepoResult};
use shared::models::{BankDetails, ConsumptionRecord, Order, OrderListQuery, OrderStatus};
use sqlx::SqlitePool;
use std::time::Duration;

const COLUMNS: &str = "id, order_id, daily_order_number, order_date, items, contact, bank_details, \
     total_price, is_paid, paid_at, transaction_id, payment_error, payment_attempts, order_status, \
     ingredient_consumption, completed_at, created_at, updated_at";

/// Default and maximum page size for order listings
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// A payment claim older than this is considered abandoned
pub const DEFAULT_CLAIM_TTL: Duration = Duration::from_secs(30);

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_id: String,
    daily_order_number: i64,
    order_date: String,
    items: String,
    contact: String,
    bank_details: Option<String>,
    total_price: f64,
    is_paid: bool,
    paid_at: Option<i64>,
    transaction_id: Option<String>,
    payment_error: Option<String>,
    payment_attempts: i32,
    order_status: OrderStatus,
    ingredient_consumption: String,
    completed_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            order_id: row.order_id,
            daily_order_number: row.daily_order_number,
            order_date: row.order_date,
            items: serde_json::from_str(&row.items)?,
            contact: serde_json::from_str(&row.contact)?,
            bank_details: row
                .bank_details
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            total_price: row.total_price,
            is_paid: row.is_paid,
            paid_at: row.paid_at,
            transaction_id: row.transaction_id,
            payment_error: row.payment_error,
            payment_attempts: row.payment_attempts,
            order_status: row.order_status,
            ingredient_consumption: serde_json::from_str(&row.ingredient_consumption)?,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Outcome of trying to start a payment attempt
#[derive(Debug)]
pub enum PaymentClaim {
    /// The caller owns the attempt; order reflects the incremented counter
    Claimed(Order),
    NotFound,
    AlreadyPaid(Order),
    /// Order is not pending (cancelled)
    NotPayable(Order),
    /// Another attempt holds a live claim
    InProgress(Order),
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    claim_ttl_ms: i64,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            claim_ttl_ms: DEFAULT_CLAIM_TTL.as_millis() as i64,
        }
    }

    /// Claims older than `ttl` can be taken over by a new attempt or an
    /// admin status change
    pub fn with_claim_ttl(mut self, ttl: Duration) -> Self {
        self.claim_ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self
    }

    /// Claims taken at or before this instant have expired
    fn stale_before(&self, now: i64) -> i64 {
        now.saturating_sub(self.claim_ttl_ms)
    }

    pub async fn insert(&self, order: &Order) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, order_id, daily_order_number, order_date, items, contact,
                 bank_details, total_price, is_paid, paid_at, transaction_id, payment_error,
                 payment_attempts, order_status, ingredient_consumption, completed_at,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        )
        .bind(order.id)
        .bind(&order.order_id)
        .bind(order.daily_order_number)
        .bind(&order.order_date)
        .bind(serde_json::to_string(&order.items)?)
        .bind(serde_json::to_string(&order.contact)?)
        .bind(
            order
                .bank_details
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(order.total_price)
        .bind(order.is_paid)
        .bind(order.paid_at)
        .bind(&order.transaction_id)
        .bind(&order.payment_error)
        .bind(order.payment_attempts)
        .bind(order.order_status)
        .bind(serde_json::to_string(&order.ingredient_consumption)?)
        .bind(order.completed_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        Ok(self.find_row(id).await?.map(Order::try_from).transpose()?)
    }

    async fn find_row(&self, id: i64) -> RepoResult<Option<OrderRow>> {
        let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = ?");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_daily_number(
        &self,
        order_date: &str,
        daily_order_number: i64,
    ) -> RepoResult<Option<Order>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM orders WHERE order_date = ? AND daily_order_number = ?"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_date)
            .bind(daily_order_number)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    /// Newest first
    pub async fn list(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0).max(0);
        let sql = format!(
            "SELECT {COLUMNS} FROM orders
             WHERE (?1 IS NULL OR order_status = ?1) AND (?2 IS NULL OR order_date = ?2)
             ORDER BY created_at DESC, id DESC
             LIMIT ?3 OFFSET ?4"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(query.status.map(|s| s.as_str()))
            .bind(&query.date)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    /// Atomically start a payment attempt.
    ///
    /// Succeeds only for an unpaid pending order with no live claim;
    /// bumps `payment_attempts`. An expired claim is taken over.
    pub async fn claim_payment(&self, id: i64, now: i64) -> RepoResult<PaymentClaim> {
        let sql = format!(
            "UPDATE orders
             SET payment_claimed_at = ?1, payment_attempts = payment_attempts + 1, updated_at = ?1
             WHERE id = ?2 AND is_paid = 0 AND order_status = 'pending'
               AND (payment_claimed_at IS NULL OR payment_claimed_at <= ?3)
             RETURNING {COLUMNS}"
        );
        let claimed = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(now)
            .bind(id)
            .bind(self.stale_before(now))
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = claimed {
            return Ok(PaymentClaim::Claimed(row.try_into()?));
        }

        let Some(row) = self.find_row(id).await? else {
            return Ok(PaymentClaim::NotFound);
        };
        let order = Order::try_from(row)?;
        // A pending, unpaid order that could not be claimed is held by another
        // attempt (or was released between the two statements).
        Ok(if order.is_paid {
            PaymentClaim::AlreadyPaid(order)
        } else if order.order_status != OrderStatus::Pending {
            PaymentClaim::NotPayable(order)
        } else {
            PaymentClaim::InProgress(order)
        })
    }

    /// Record a confirmed transfer and release the claim.
    ///
    /// A pending order advances to `preparing`.
    pub async fn complete_payment(
        &self,
        id: i64,
        bank_details: &BankDetails,
        transaction_id: &str,
        total_price: f64,
        paid_at: i64,
    ) -> RepoResult<Option<Order>> {
        let sql = format!(
            "UPDATE orders
             SET is_paid = 1, paid_at = ?1, transaction_id = ?2, payment_error = NULL,
                 bank_details = ?3, total_price = ?4, payment_claimed_at = NULL,
                 order_status = CASE WHEN order_status = 'pending' THEN 'preparing' ELSE order_status END,
                 updated_at = ?1
             WHERE id = ?5
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(paid_at)
            .bind(transaction_id)
            .bind(serde_json::to_string(bank_details)?)
            .bind(total_price)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    /// Record a failed attempt and release the claim; status stays `pending`
    pub async fn fail_payment(
        &self,
        id: i64,
        bank_details: &BankDetails,
        error: &str,
        total_price: f64,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        let sql = format!(
            "UPDATE orders
             SET payment_error = ?1, bank_details = ?2, total_price = ?3, payment_claimed_at = NULL,
                 updated_at = ?4
             WHERE id = ?5
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(error)
            .bind(serde_json::to_string(bank_details)?)
            .bind(total_price)
            .bind(now)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    /// Drop the claim without recording an outcome
    pub async fn release_payment_claim(&self, id: i64) -> RepoResult<()> {
        sqlx::query("UPDATE orders SET payment_claimed_at = NULL WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Compare-and-set status change. Returns true only for the caller whose
    /// update applied; never applies while a live payment claim is held.
    pub async fn transition_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
        now: i64,
    ) -> RepoResult<bool> {
        let completed_at = (to == OrderStatus::Completed).then_some(now);
        let rows = sqlx::query(
            "UPDATE orders
             SET order_status = ?1, completed_at = COALESCE(?2, completed_at), updated_at = ?3
             WHERE id = ?4 AND order_status = ?5
               AND (payment_claimed_at IS NULL OR payment_claimed_at <= ?6)",
        )
        .bind(to)
        .bind(completed_at)
        .bind(now)
        .bind(id)
        .bind(from)
        .bind(self.stale_before(now))
        .execute(&self.pool)
        .await?;
        Ok(rows.rows_affected() > 0)
    }

    pub async fn store_consumption(
        &self,
        id: i64,
        records: &[ConsumptionRecord],
        now: i64,
    ) -> RepoResult<()> {
        sqlx::query("UPDATE orders SET ingredient_consumption = ?, updated_at = ? WHERE id = ?")
            .bind(serde_json::to_string(records)?)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn is_payment_in_progress(&self, id: i64, now: i64) -> RepoResult<bool> {
        let flag = sqlx::query_scalar::<_, bool>(
            "SELECT COALESCE(payment_claimed_at > ?, 0) FROM orders WHERE id = ?",
        )
        .bind(self.stale_before(now))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(flag.unwrap_or(false))
    }
}
