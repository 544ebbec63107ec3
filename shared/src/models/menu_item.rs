//! Menu Item Model

use super::ingredient::IngredientUnit;
use serde::{Deserialize, Serialize};

/// One recipe line: how much of an ingredient a single unit of the item uses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub ingredient_id: i64,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<IngredientUnit>,
}

/// Menu item entity (菜品)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: Option<String>,
    /// Recipe; empty means the item is never auto-disabled
    pub ingredients: Vec<RecipeIngredient>,
    pub is_available: bool,
    /// `false` pins `is_available` to its manual value
    pub auto_availability: bool,
    pub availability_warning: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub auto_availability: Option<bool>,
}

/// Result of one availability recomputation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    /// Items whose availability was derived from the recipe
    pub evaluated: usize,
    pub available: usize,
    pub unavailable: usize,
    /// Available but at least one ingredient is low
    pub warned: usize,
    /// Items with manual availability
    pub skipped: usize,
    /// Items whose flag or warning actually changed
    pub changed: usize,
}
