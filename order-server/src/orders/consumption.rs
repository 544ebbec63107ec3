//! Ingredient consumption for completed orders
//!
//! Every line item is processed independently: a missing menu item, an
//! empty recipe or a failed stock write produces a record and moves on,
//! never aborting the completion.

use shared::models::{ConsumptionRecord, ConsumptionStatus, MenuItem, Order, OrderItem};

use crate::db::repository::MenuItemRepository;
use crate::inventory::StockLedger;

#[derive(Clone)]
pub struct ConsumptionProcess {
    menu_items: MenuItemRepository,
    ledger: StockLedger,
}

impl ConsumptionProcess {
    pub fn new(menu_items: MenuItemRepository, ledger: StockLedger) -> Self {
        Self { menu_items, ledger }
    }

    /// Deduct recipe quantities for every line of `order`, then refresh
    /// menu availability once.
    pub async fn run(&self, order: &Order) -> Vec<ConsumptionRecord> {
        let reason = format!("Order {} completed", order.order_id);
        let mut records = Vec::new();

        for item in &order.items {
            match self.resolve_menu_item(item).await {
                Ok(Some(menu_item)) if menu_item.ingredients.is_empty() => {
                    records.push(line_record(
                        item,
                        ConsumptionStatus::Skipped,
                        "Menu item has no recipe",
                    ));
                }
                Ok(Some(menu_item)) => {
                    self.consume_recipe(item, &menu_item, &reason, &mut records)
                        .await;
                }
                Ok(None) => {
                    tracing::warn!(
                        order_id = order.id,
                        item = %item.name,
                        "No menu item matches order line, skipping consumption"
                    );
                    records.push(line_record(
                        item,
                        ConsumptionStatus::Skipped,
                        "No matching menu item",
                    ));
                }
                Err(e) => {
                    tracing::error!(
                        order_id = order.id,
                        item = %item.name,
                        error = %e,
                        "Failed to look up menu item"
                    );
                    records.push(line_record(
                        item,
                        ConsumptionStatus::Failed,
                        "Menu item lookup failed",
                    ));
                }
            }
        }

        self.ledger.refresh_availability().await;
        records
    }

    /// By the id captured at order time, falling back to the display name
    async fn resolve_menu_item(
        &self,
        item: &OrderItem,
    ) -> crate::db::repository::RepoResult<Option<MenuItem>> {
        if let Some(id) = item.menu_item_id {
            if let Some(found) = self.menu_items.find_by_id(id).await? {
                return Ok(Some(found));
            }
            tracing::debug!(menu_item_id = id, item = %item.name, "Menu item id no longer resolves, matching by name");
        }
        self.menu_items.find_by_name(&item.name).await
    }

    async fn consume_recipe(
        &self,
        item: &OrderItem,
        menu_item: &MenuItem,
        reason: &str,
        records: &mut Vec<ConsumptionRecord>,
    ) {
        for line in &menu_item.ingredients {
            let amount = line.quantity * f64::from(item.quantity);
            let record = match self.ledger.consume(line.ingredient_id, amount, reason).await {
                Ok(mutation) => {
                    let ingredient = mutation.ingredient;
                    let status = if ingredient.current_stock < 0.0 {
                        ConsumptionStatus::Shortfall
                    } else {
                        ConsumptionStatus::Success
                    };
                    ConsumptionRecord {
                        menu_item_name: menu_item.name.clone(),
                        ingredient_name: Some(ingredient.name),
                        consumed_quantity: amount,
                        unit: Some(ingredient.unit.as_str().to_string()),
                        remaining_stock_after: Some(ingredient.current_stock),
                        status,
                        note: (status == ConsumptionStatus::Shortfall)
                            .then(|| "Stock went below zero".to_string()),
                    }
                }
                Err(e) => {
                    tracing::error!(
                        menu_item = %menu_item.name,
                        ingredient_id = line.ingredient_id,
                        error = %e,
                        "Failed to consume ingredient"
                    );
                    ConsumptionRecord {
                        menu_item_name: menu_item.name.clone(),
                        ingredient_name: None,
                        consumed_quantity: 0.0,
                        unit: line.unit.map(|u| u.as_str().to_string()),
                        remaining_stock_after: None,
                        status: ConsumptionStatus::Failed,
                        note: Some(format!("Ingredient {}: {e}", line.ingredient_id)),
                    }
                }
            };
            records.push(record);
        }
    }
}

fn line_record(item: &OrderItem, status: ConsumptionStatus, note: &str) -> ConsumptionRecord {
    ConsumptionRecord {
        menu_item_name: item.name.clone(),
        ingredient_name: None,
        consumed_quantity: 0.0,
        unit: None,
        remaining_stock_after: None,
        status,
        note: Some(note.to_string()),
    }
}
