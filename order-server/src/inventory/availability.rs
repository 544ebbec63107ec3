//! Availability Recalculator
//!
//! Menu item availability is always derived from a fresh snapshot of
//! ingredient statuses, never patched incrementally, so running it more
//! often than needed is harmless.

use std::collections::HashMap;
use std::sync::Arc;

use shared::models::{AvailabilityReport, RecipeIngredient, StockStatus};

use crate::core::ServiceResult;
use crate::db::repository::{IngredientRepository, MenuItemRepository};
use crate::utils::Clock;

/// Derived availability of one menu item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// Still orderable, some ingredients are running low
    Warned(String),
    Unavailable(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        !matches!(self, Availability::Unavailable(_))
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Availability::Available => None,
            Availability::Warned(msg) | Availability::Unavailable(msg) => Some(msg),
        }
    }
}

/// Evaluate a recipe against the current stock snapshot.
///
/// An ingredient missing from the snapshot counts as out of stock.
pub fn evaluate(
    recipe: &[RecipeIngredient],
    stock: &HashMap<i64, (String, StockStatus)>,
) -> Availability {
    let mut out = Vec::new();
    let mut low = Vec::new();

    for line in recipe {
        match stock.get(&line.ingredient_id) {
            Some((name, StockStatus::OutOfStock)) => out.push(name.clone()),
            Some((name, StockStatus::LowStock)) => low.push(name.clone()),
            Some((_, StockStatus::InStock)) => {}
            None => out.push(format!("ingredient #{}", line.ingredient_id)),
        }
    }

    if !out.is_empty() {
        Availability::Unavailable(format!("Out of stock: {}", out.join(", ")))
    } else if !low.is_empty() {
        Availability::Warned(format!("Low stock: {}", low.join(", ")))
    } else {
        Availability::Available
    }
}

#[derive(Clone)]
pub struct AvailabilityRecalculator {
    menu_items: MenuItemRepository,
    ingredients: IngredientRepository,
    clock: Arc<dyn Clock>,
}

impl AvailabilityRecalculator {
    pub fn new(
        menu_items: MenuItemRepository,
        ingredients: IngredientRepository,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            menu_items,
            ingredients,
            clock,
        }
    }

    /// Re-derive availability of every menu item that opted in.
    pub async fn recompute_all(&self) -> ServiceResult<AvailabilityReport> {
        let stock = self.ingredients.status_map().await?;
        let items = self.menu_items.find_all().await?;
        let now = self.clock.now_millis();

        let mut report = AvailabilityReport::default();
        for item in items {
            if !item.auto_availability {
                report.skipped += 1;
                continue;
            }
            report.evaluated += 1;

            let availability = evaluate(&item.ingredients, &stock);
            match &availability {
                Availability::Available => report.available += 1,
                Availability::Warned(_) => {
                    report.available += 1;
                    report.warned += 1;
                }
                Availability::Unavailable(_) => report.unavailable += 1,
            }

            let changed = self
                .menu_items
                .set_availability(
                    item.id,
                    availability.is_available(),
                    availability.warning(),
                    now,
                )
                .await?;
            if changed {
                report.changed += 1;
                tracing::info!(
                    menu_item_id = item.id,
                    menu_item = %item.name,
                    available = availability.is_available(),
                    warning = ?availability.warning(),
                    "Menu item availability changed"
                );
            }
        }

        tracing::debug!(
            evaluated = report.evaluated,
            unavailable = report.unavailable,
            warned = report.warned,
            changed = report.changed,
            "Availability recomputed"
        );
        Ok(report)
    }
}
