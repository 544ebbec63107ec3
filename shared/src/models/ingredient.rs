//! Ingredient Model

use serde::{Deserialize, Serialize};

/// Ingredient category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum IngredientCategory {
    Vegetables,
    Fruits,
    Meat,
    Seafood,
    Dairy,
    Grains,
    Spices,
    Sauces,
    Beverages,
    Other,
}

/// Unit of measure for stock and recipe quantities
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum IngredientUnit {
    Kg,
    G,
    L,
    Ml,
    Pieces,
    Cups,
    Tbsp,
    Tsp,
}

impl IngredientUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::G => "g",
            Self::L => "l",
            Self::Ml => "ml",
            Self::Pieces => "pieces",
            Self::Cups => "cups",
            Self::Tbsp => "tbsp",
            Self::Tsp => "tsp",
        }
    }
}

/// Derived stock sufficiency
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Classify a stock level.
    ///
    /// Mirrors the `stock_status` generated column of the `ingredient` table;
    /// the two must stay in sync.
    pub fn classify(current_stock: f64, min_stock_level: f64) -> Self {
        if current_stock <= 0.0 {
            Self::OutOfStock
        } else if current_stock <= min_stock_level {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::LowStock => "low_stock",
            Self::OutOfStock => "out_of_stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock adjustment kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockAction {
    Add,
    Subtract,
    Set,
}

impl StockAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Set => "set",
        }
    }
}

/// Ingredient entity (库存原料)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub category: IngredientCategory,
    pub current_stock: f64,
    pub unit: IngredientUnit,
    pub min_stock_level: f64,
    pub max_stock_level: f64,
    pub cost_per_unit: f64,
    /// Calendar day (YYYY-MM-DD)
    pub expiry_date: Option<String>,
    pub last_restocked: Option<i64>,
    /// Generated by the database from `current_stock` and `min_stock_level`
    pub stock_status: StockStatus,
    /// Generated by the database: `current_stock * cost_per_unit`
    pub stock_value: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create ingredient payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientCreate {
    pub name: String,
    pub category: IngredientCategory,
    #[serde(default)]
    pub current_stock: f64,
    pub unit: IngredientUnit,
    #[serde(default)]
    pub min_stock_level: f64,
    #[serde(default)]
    pub max_stock_level: Option<f64>,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// Stock update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub action: StockAction,
    pub quantity: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Summary of a single stock mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub previous_stock: f64,
    pub new_stock: f64,
    pub change: f64,
    pub action: StockAction,
    pub reason: Option<String>,
    pub previous_status: StockStatus,
    pub new_status: StockStatus,
}

impl StockChange {
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.new_status
    }
}

/// Stock update response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateResult {
    pub ingredient: Ingredient,
    pub stock_change: StockChange,
}

/// Ingredient list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientListQuery {
    #[serde(default)]
    pub include_inactive: bool,
    pub status: Option<StockStatus>,
}

/// Aggregate inventory view
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_ingredients: i64,
    pub in_stock: i64,
    pub low_stock: i64,
    pub out_of_stock: i64,
    pub total_stock_value: f64,
}
