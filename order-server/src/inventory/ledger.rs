//! Stock Ledger
//!
//! Owns every write to ingredient stock. Each write is a single relative
//! `UPDATE` so concurrent adjustments and consumptions cannot lose updates.
//! After a write the ledger publishes the change, raises an alert when the
//! stock status moved, and (for admin writes) re-derives menu availability.

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::message::{
    AlertType, Event, InventoryAlertPayload, InventoryUpdatePayload, Room,
};
use shared::models::{
    Ingredient, IngredientCreate, IngredientListQuery, InventorySummary, StockAction,
    StockAdjustment, StockChange, StockUpdateResult,
};

use super::availability::AvailabilityRecalculator;
use crate::core::{ServiceError, ServiceResult};
use crate::db::repository::{
    IngredientRepository, MenuItemRepository, RepoError, StockMutation,
};
use crate::notify::SharedNotifier;
use crate::utils::Clock;

#[derive(Clone)]
pub struct StockLedger {
    ingredients: IngredientRepository,
    menu_items: MenuItemRepository,
    availability: AvailabilityRecalculator,
    notifier: SharedNotifier,
    clock: Arc<dyn Clock>,
}

impl StockLedger {
    pub fn new(
        ingredients: IngredientRepository,
        menu_items: MenuItemRepository,
        availability: AvailabilityRecalculator,
        notifier: SharedNotifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ingredients,
            menu_items,
            availability,
            notifier,
            clock,
        }
    }

    pub async fn create_ingredient(&self, data: IngredientCreate) -> ServiceResult<Ingredient> {
        validate_create(&data)?;

        let ingredient = self
            .ingredients
            .create(data, self.clock.now_millis())
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(msg) => {
                    ServiceError::App(AppError::with_message(ErrorCode::IngredientNameExists, msg))
                }
                other => other.into(),
            })?;

        tracing::info!(
            ingredient_id = ingredient.id,
            ingredient = %ingredient.name,
            stock = ingredient.current_stock,
            status = %ingredient.stock_status,
            "Ingredient created"
        );
        self.refresh_availability().await;
        Ok(ingredient)
    }

    pub async fn get_ingredient(&self, id: i64) -> ServiceResult<Ingredient> {
        self.ingredients
            .find_by_id(id)
            .await?
            .ok_or_else(|| ingredient_not_found(id))
    }

    pub async fn list_ingredients(
        &self,
        query: &IngredientListQuery,
    ) -> ServiceResult<Vec<Ingredient>> {
        Ok(self.ingredients.list(query).await?)
    }

    pub async fn inventory_summary(&self) -> ServiceResult<InventorySummary> {
        Ok(self.ingredients.summary().await?)
    }

    /// Admin stock adjustment (`add` / `subtract` / `set`).
    ///
    /// `subtract` floors at zero; `add` stamps `lastRestocked`.
    pub async fn adjust_stock(
        &self,
        id: i64,
        adjustment: StockAdjustment,
    ) -> ServiceResult<StockUpdateResult> {
        validate_quantity(adjustment.action, adjustment.quantity)?;

        let mutation = self
            .ingredients
            .adjust(
                id,
                adjustment.action,
                adjustment.quantity,
                self.clock.now_millis(),
            )
            .await?
            .ok_or_else(|| ingredient_not_found(id))?;

        let stock_change = stock_change(&mutation, adjustment.action, adjustment.reason);
        tracing::info!(
            ingredient_id = id,
            action = adjustment.action.as_str(),
            quantity = adjustment.quantity,
            previous_stock = stock_change.previous_stock,
            new_stock = stock_change.new_stock,
            "Stock adjusted"
        );

        self.publish_change(&mutation.ingredient, &stock_change);
        self.refresh_availability().await;

        Ok(StockUpdateResult {
            ingredient: mutation.ingredient,
            stock_change,
        })
    }

    /// Deduct stock for a completed order. No floor: a deficit shows up as
    /// negative stock. Availability is left to the caller, which refreshes
    /// once per order.
    pub async fn consume(
        &self,
        id: i64,
        quantity: f64,
        reason: &str,
    ) -> ServiceResult<StockMutation> {
        let mutation = self
            .ingredients
            .consume(id, quantity, self.clock.now_millis())
            .await?
            .ok_or_else(|| ingredient_not_found(id))?;

        let stock_change = stock_change(&mutation, StockAction::Subtract, Some(reason.to_string()));
        if mutation.ingredient.current_stock < 0.0 {
            tracing::warn!(
                ingredient_id = id,
                ingredient = %mutation.ingredient.name,
                stock = mutation.ingredient.current_stock,
                "Consumption drove stock below zero"
            );
        }

        self.publish_change(&mutation.ingredient, &stock_change);
        Ok(mutation)
    }

    /// Soft delete; refused while any recipe references the ingredient.
    pub async fn deactivate_ingredient(&self, id: i64) -> ServiceResult<()> {
        let ingredient = self.get_ingredient(id).await?;
        if self.menu_items.references_ingredient(id).await? {
            return Err(AppError::with_message(
                ErrorCode::IngredientInUse,
                format!("Ingredient '{}' is used by a menu item recipe", ingredient.name),
            )
            .into());
        }

        if !self.ingredients.deactivate(id, self.clock.now_millis()).await? {
            return Err(ingredient_not_found(id));
        }
        tracing::info!(ingredient_id = id, ingredient = %ingredient.name, "Ingredient deactivated");
        Ok(())
    }

    /// Recompute menu availability. Failures are logged: stock writes have
    /// already committed by the time this runs.
    pub async fn refresh_availability(&self) {
        if let Err(e) = self.availability.recompute_all().await {
            tracing::error!(error = %e, "Failed to recompute menu availability");
        }
    }

    fn publish_change(&self, ingredient: &Ingredient, change: &StockChange) {
        let timestamp = self.clock.now_millis();
        self.notifier.publish(
            Room::InventoryManagement,
            Event::InventoryUpdate(InventoryUpdatePayload {
                ingredient: ingredient.clone(),
                stock_change: change.clone(),
                timestamp,
            }),
        );

        let Some(alert_type) = AlertType::for_change(change) else {
            return;
        };
        let alert = InventoryAlertPayload::new(alert_type, ingredient, timestamp);
        tracing::info!(
            ingredient_id = ingredient.id,
            from = %change.previous_status,
            to = %change.new_status,
            "{}",
            alert.message
        );
        self.notifier.publish_to(
            &[Room::InventoryManagement, Room::Broadcast],
            Event::InventoryAlert(alert),
        );
    }
}

fn stock_change(mutation: &StockMutation, action: StockAction, reason: Option<String>) -> StockChange {
    let new_stock = mutation.ingredient.current_stock;
    StockChange {
        previous_stock: mutation.previous_stock,
        new_stock,
        change: new_stock - mutation.previous_stock,
        action,
        reason,
        previous_status: mutation.previous_status,
        new_status: mutation.ingredient.stock_status,
    }
}

fn ingredient_not_found(id: i64) -> ServiceError {
    AppError::with_message(ErrorCode::IngredientNotFound, format!("Ingredient {id} not found"))
        .into()
}

fn validate_quantity(action: StockAction, quantity: f64) -> Result<(), AppError> {
    let valid = quantity.is_finite()
        && match action {
            StockAction::Set => quantity >= 0.0,
            StockAction::Add | StockAction::Subtract => quantity > 0.0,
        };
    if valid {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::InvalidStockQuantity,
            format!("Invalid quantity {quantity} for {}", action.as_str()),
        )
        .with_detail("quantity", quantity.to_string()))
    }
}

fn validate_create(data: &IngredientCreate) -> Result<(), AppError> {
    if data.name.trim().is_empty() {
        return Err(AppError::validation("Ingredient name must not be empty"));
    }
    for (field, value) in [
        ("currentStock", data.current_stock),
        ("minStockLevel", data.min_stock_level),
        ("costPerUnit", data.cost_per_unit),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::with_message(
                ErrorCode::InvalidStockQuantity,
                format!("{field} must be a non-negative number"),
            ));
        }
    }
    match data.max_stock_level {
        Some(max) if !max.is_finite() || max < data.min_stock_level => Err(AppError::validation(
            "maxStockLevel must not be below minStockLevel",
        )),
        _ => Ok(()),
    }
}
