//! Menu Item Repository
//!
//! Recipes are stored as a JSON array on the row.

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, RecipeIngredient};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, price, category, ingredients, is_available, auto_availability, \
     availability_warning, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    name: String,
    price: f64,
    category: Option<String>,
    ingredients: String,
    is_available: bool,
    auto_availability: bool,
    availability_warning: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = RepoError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let ingredients: Vec<RecipeIngredient> = serde_json::from_str(&row.ingredients)?;
        Ok(MenuItem {
            id: row.id,
            name: row.name,
            price: row.price,
            category: row.category,
            ingredients,
            is_available: row.is_available,
            auto_availability: row.auto_availability,
            availability_warning: row.availability_warning,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct MenuItemRepository {
    pool: SqlitePool,
}

impl MenuItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<MenuItem>> {
        let sql = format!("SELECT {COLUMNS} FROM menu_items ORDER BY name");
        let rows = sqlx::query_as::<_, MenuItemRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(MenuItem::try_from).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<MenuItem>> {
        let sql = format!("SELECT {COLUMNS} FROM menu_items WHERE id = ?");
        let row = sqlx::query_as::<_, MenuItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(MenuItem::try_from).transpose()
    }

    /// Find by display name (first match)
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<MenuItem>> {
        let sql = format!("SELECT {COLUMNS} FROM menu_items WHERE name = ? ORDER BY created_at LIMIT 1");
        let row = sqlx::query_as::<_, MenuItemRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(MenuItem::try_from).transpose()
    }

    pub async fn create(&self, data: MenuItemCreate, now: i64) -> RepoResult<MenuItem> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("Menu item name must not be empty".into()));
        }
        let id = shared::util::snowflake_id();
        let ingredients = serde_json::to_string(&data.ingredients)?;

        sqlx::query(
            "INSERT INTO menu_items (id, name, price, category, ingredients, is_available,
                 auto_availability, availability_warning, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?8)",
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.price)
        .bind(&data.category)
        .bind(ingredients)
        .bind(data.is_available.unwrap_or(true))
        .bind(data.auto_availability.unwrap_or(true))
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
    }

    /// Write derived availability; no-op (returns false) if nothing changed
    pub async fn set_availability(
        &self,
        id: i64,
        is_available: bool,
        warning: Option<&str>,
        now: i64,
    ) -> RepoResult<bool> {
        let rows = sqlx::query(
            "UPDATE menu_items SET is_available = ?1, availability_warning = ?2, updated_at = ?3
             WHERE id = ?4 AND (is_available != ?1 OR availability_warning IS NOT ?2)",
        )
        .bind(is_available)
        .bind(warning)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(rows.rows_affected() > 0)
    }

    /// Whether any recipe lists the ingredient
    pub async fn references_ingredient(&self, ingredient_id: i64) -> RepoResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM menu_items, json_each(menu_items.ingredients) AS recipe
             WHERE json_extract(recipe.value, '$.ingredientId') = ?",
        )
        .bind(ingredient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}
