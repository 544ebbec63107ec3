//! Ingredient Repository
//!
//! `stock_status` and `stock_value` are generated columns, so every write
//! below only touches `current_stock`; the status can never drift from the
//! quantity. Each mutation stamps `previous_stock` in the same statement so
//! callers can recover the old→new transition from one `RETURNING` row.

use super::{RepoError, RepoResult};
use shared::models::{
    Ingredient, IngredientCreate, IngredientListQuery, InventorySummary, StockAction, StockStatus,
};
use sqlx::SqlitePool;
use std::collections::HashMap;

const COLUMNS: &str = "id, name, category, current_stock, unit, min_stock_level, max_stock_level, \
     cost_per_unit, expiry_date, last_restocked, stock_status, stock_value, is_active, \
     created_at, updated_at";

/// Result of a single atomic stock write
#[derive(Debug, Clone)]
pub struct StockMutation {
    pub ingredient: Ingredient,
    pub previous_stock: f64,
    pub previous_status: StockStatus,
}

#[derive(sqlx::FromRow)]
struct MutationRow {
    #[sqlx(flatten)]
    ingredient: Ingredient,
    previous_stock: f64,
}

impl From<MutationRow> for StockMutation {
    fn from(row: MutationRow) -> Self {
        let previous_status =
            StockStatus::classify(row.previous_stock, row.ingredient.min_stock_level);
        Self {
            ingredient: row.ingredient,
            previous_stock: row.previous_stock,
            previous_status,
        }
    }
}

#[derive(Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Ingredient>> {
        let sql = format!("SELECT {COLUMNS} FROM ingredients WHERE id = ?");
        let ingredient = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ingredient)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Ingredient>> {
        let sql = format!("SELECT {COLUMNS} FROM ingredients WHERE name = ? LIMIT 1");
        let ingredient = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ingredient)
    }

    /// Fresh name and status of every ingredient, keyed by id
    pub async fn status_map(&self) -> RepoResult<HashMap<i64, (String, StockStatus)>> {
        let rows = sqlx::query_as::<_, (i64, String, StockStatus)>(
            "SELECT id, name, stock_status FROM ingredients",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name, status)| (id, (name, status)))
            .collect())
    }

    pub async fn list(&self, query: &IngredientListQuery) -> RepoResult<Vec<Ingredient>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM ingredients
             WHERE (?1 OR is_active = 1) AND (?2 IS NULL OR stock_status = ?2)
             ORDER BY name"
        );
        let ingredients = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(query.include_inactive)
            .bind(query.status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;
        Ok(ingredients)
    }

    pub async fn create(&self, data: IngredientCreate, now: i64) -> RepoResult<Ingredient> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Ingredient '{}' already exists",
                data.name
            )));
        }

        let id = shared::util::snowflake_id();
        let max_stock_level = data
            .max_stock_level
            .unwrap_or_else(|| data.current_stock.max(data.min_stock_level));

        sqlx::query(
            "INSERT INTO ingredients (id, name, category, current_stock, previous_stock, unit,
                 min_stock_level, max_stock_level, cost_per_unit, expiry_date, last_restocked,
                 is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7, ?8, ?9, NULL, 1, ?10, ?10)",
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.category)
        .bind(data.current_stock)
        .bind(data.unit)
        .bind(data.min_stock_level)
        .bind(max_stock_level)
        .bind(data.cost_per_unit)
        .bind(&data.expiry_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create ingredient".into()))
    }

    /// Apply an admin stock adjustment in one statement.
    ///
    /// `subtract` floors at zero, `add` stamps `last_restocked`.
    /// Returns `None` if the ingredient does not exist.
    pub async fn adjust(
        &self,
        id: i64,
        action: StockAction,
        quantity: f64,
        now: i64,
    ) -> RepoResult<Option<StockMutation>> {
        let set_clause = match action {
            StockAction::Add => "current_stock = current_stock + ?1, last_restocked = ?2",
            StockAction::Subtract => "current_stock = MAX(0.0, current_stock - ?1)",
            StockAction::Set => "current_stock = ?1",
        };
        self.mutate(set_clause, id, quantity, now).await
    }

    /// Deduct stock without a floor; the result may go negative.
    pub async fn consume(&self, id: i64, quantity: f64, now: i64) -> RepoResult<Option<StockMutation>> {
        self.mutate("current_stock = current_stock - ?1", id, quantity, now)
            .await
    }

    async fn mutate(
        &self,
        set_clause: &str,
        id: i64,
        quantity: f64,
        now: i64,
    ) -> RepoResult<Option<StockMutation>> {
        // SET expressions all read the pre-update row, so previous_stock
        // captures the old quantity.
        let sql = format!(
            "UPDATE ingredients
             SET previous_stock = current_stock, {set_clause}, updated_at = ?2
             WHERE id = ?3
             RETURNING {COLUMNS}, previous_stock"
        );
        let row = sqlx::query_as::<_, MutationRow>(&sql)
            .bind(quantity)
            .bind(now)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StockMutation::from))
    }

    /// Soft delete. Returns false if the ingredient does not exist.
    pub async fn deactivate(&self, id: i64, now: i64) -> RepoResult<bool> {
        let rows = sqlx::query("UPDATE ingredients SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(rows.rows_affected() > 0)
    }

    /// Counts per stock status and total stock value over active ingredients
    pub async fn summary(&self) -> RepoResult<InventorySummary> {
        let (total, in_stock, low_stock, out_of_stock, value) =
            sqlx::query_as::<_, (i64, i64, i64, i64, f64)>(
                "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN stock_status = 'in_stock' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN stock_status = 'low_stock' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN stock_status = 'out_of_stock' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(stock_value), 0.0)
                 FROM ingredients WHERE is_active = 1",
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(InventorySummary {
            total_ingredients: total,
            in_stock,
            low_stock,
            out_of_stock,
            total_stock_value: crate::orders::money::round_money(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use shared::models::{IngredientCategory, IngredientUnit};

    fn create(name: &str, stock: f64, min: f64) -> IngredientCreate {
        IngredientCreate {
            name: name.into(),
            category: IngredientCategory::Vegetables,
            current_stock: stock,
            unit: IngredientUnit::Kg,
            min_stock_level: min,
            max_stock_level: None,
            cost_per_unit: 2.5,
            expiry_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_classifies_and_values_stock() {
        let repo = IngredientRepository::new(test_support::pool().await);
        let tomato = repo.create(create("Tomato", 5.0, 10.0), 1).await.unwrap();

        assert_eq!(tomato.stock_status, StockStatus::LowStock);
        assert_eq!(tomato.stock_value, 12.5);
        assert_eq!(tomato.max_stock_level, 10.0);
        assert!(tomato.is_active);
        assert!(tomato.last_restocked.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let repo = IngredientRepository::new(test_support::pool().await);
        repo.create(create("Basil", 1.0, 0.5), 1).await.unwrap();
        let err = repo.create(create("Basil", 3.0, 0.5), 2).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_subtract_floors_at_zero_and_reports_transition() {
        let repo = IngredientRepository::new(test_support::pool().await);
        let onion = repo.create(create("Onion", 5.0, 10.0), 1).await.unwrap();

        let m = repo
            .adjust(onion.id, StockAction::Subtract, 8.0, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.previous_stock, 5.0);
        assert_eq!(m.previous_status, StockStatus::LowStock);
        assert_eq!(m.ingredient.current_stock, 0.0);
        assert_eq!(m.ingredient.stock_status, StockStatus::OutOfStock);
        assert_eq!(m.ingredient.stock_value, 0.0);
    }

    #[tokio::test]
    async fn test_add_stamps_last_restocked() {
        let repo = IngredientRepository::new(test_support::pool().await);
        let rice = repo.create(create("Rice", 0.0, 2.0), 1).await.unwrap();

        let m = repo
            .adjust(rice.id, StockAction::Add, 20.0, 77)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.ingredient.current_stock, 20.0);
        assert_eq!(m.ingredient.last_restocked, Some(77));
        assert_eq!(m.previous_status, StockStatus::OutOfStock);
        assert_eq!(m.ingredient.stock_status, StockStatus::InStock);

        let m = repo
            .adjust(rice.id, StockAction::Set, 1.5, 78)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.previous_stock, 20.0);
        assert_eq!(m.ingredient.stock_status, StockStatus::LowStock);
        assert_eq!(m.ingredient.last_restocked, Some(77));
    }

    #[tokio::test]
    async fn test_consume_may_go_negative() {
        let repo = IngredientRepository::new(test_support::pool().await);
        let beef = repo.create(create("Beef", 1.0, 0.5), 1).await.unwrap();

        let m = repo.consume(beef.id, 1.5, 2).await.unwrap().unwrap();
        assert_eq!(m.ingredient.current_stock, -0.5);
        assert_eq!(m.ingredient.stock_status, StockStatus::OutOfStock);
        assert_eq!(m.previous_status, StockStatus::InStock);
    }

    #[tokio::test]
    async fn test_mutation_on_missing_ingredient_returns_none() {
        let repo = IngredientRepository::new(test_support::pool().await);
        assert!(repo.adjust(42, StockAction::Add, 1.0, 1).await.unwrap().is_none());
        assert!(repo.consume(42, 1.0, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_summary() {
        let repo = IngredientRepository::new(test_support::pool().await);
        repo.create(create("A", 50.0, 10.0), 1).await.unwrap();
        repo.create(create("B", 5.0, 10.0), 1).await.unwrap();
        let c = repo.create(create("C", 0.0, 10.0), 1).await.unwrap();
        let d = repo.create(create("D", 0.0, 10.0), 1).await.unwrap();
        assert!(repo.deactivate(d.id, 2).await.unwrap());

        let active = repo.list(&IngredientListQuery::default()).await.unwrap();
        assert_eq!(active.len(), 3);

        let all = repo
            .list(&IngredientListQuery {
                include_inactive: true,
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 4);

        let out = repo
            .list(&IngredientListQuery {
                include_inactive: false,
                status: Some(StockStatus::OutOfStock),
            })
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, c.id);

        let summary = repo.summary().await.unwrap();
        assert_eq!(summary.total_ingredients, 3);
        assert_eq!(summary.in_stock, 1);
        assert_eq!(summary.low_stock, 1);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.total_stock_value, 137.5);
    }
}
