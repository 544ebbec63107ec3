use serde::{Deserialize, Serialize};

use crate::models::{Ingredient, IngredientUnit, OrderStatus, StockChange, StockStatus};

/// `order-update` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdatePayload {
    /// Human-readable order label
    pub order_id: String,
    pub id: i64,
    pub message: String,
    pub status: OrderStatus,
    pub timestamp: i64,
}

/// `inventory-update` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdatePayload {
    pub ingredient: Ingredient,
    pub stock_change: StockChange,
    pub timestamp: i64,
}

/// Alert kinds raised on stock status transitions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    Restocked,
}

impl AlertType {
    /// Alert raised by a stock change; `None` when the status did not move
    pub fn for_change(change: &StockChange) -> Option<Self> {
        if !change.status_changed() {
            return None;
        }
        Some(match change.new_status {
            StockStatus::OutOfStock => AlertType::OutOfStock,
            StockStatus::LowStock => AlertType::LowStock,
            StockStatus::InStock => AlertType::Restocked,
        })
    }
}

/// `inventory-alert` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAlertPayload {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Ingredient name
    pub ingredient: String,
    pub ingredient_id: i64,
    pub message: String,
    pub timestamp: i64,
    pub stock_level: f64,
    pub unit: IngredientUnit,
    pub stock_status: StockStatus,
}

impl InventoryAlertPayload {
    pub fn new(alert_type: AlertType, ingredient: &Ingredient, timestamp: i64) -> Self {
        let unit = ingredient.unit.as_str();
        let message = match alert_type {
            AlertType::OutOfStock => format!("{} is out of stock", ingredient.name),
            AlertType::LowStock => format!(
                "{} is running low: {} {} left (minimum {} {})",
                ingredient.name,
                ingredient.current_stock,
                unit,
                ingredient.min_stock_level,
                unit
            ),
            AlertType::Restocked => format!(
                "{} is back in stock: {} {}",
                ingredient.name, ingredient.current_stock, unit
            ),
        };
        Self {
            alert_type,
            ingredient: ingredient.name.clone(),
            ingredient_id: ingredient.id,
            message,
            timestamp,
            stock_level: ingredient.current_stock,
            unit: ingredient.unit,
            stock_status: ingredient.stock_status,
        }
    }
}
