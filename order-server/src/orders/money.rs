//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are `f64` in storage and on the wire; every sum is computed in
//! `Decimal` and rounded to cents on the way back.

use rust_decimal::prelude::*;
use shared::models::{OrderItem, OrderItemInput};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an f64 amount to cents
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Σ(unit_price × quantity) over stored line items
pub fn order_total(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(|item| to_decimal(item.unit_price) * Decimal::from(item.quantity))
        .sum::<Decimal>()
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate one submitted line; returns a human-readable reason on failure
pub fn validate_line(index: usize, item: &OrderItemInput) -> Result<(), String> {
    if item.name.trim().is_empty() {
        return Err(format!("items[{index}].name must not be empty"));
    }
    if !item.price.is_finite() {
        return Err(format!(
            "items[{index}].price must be a finite number, got {}",
            item.price
        ));
    }
    if item.price < 0.0 {
        return Err(format!(
            "items[{index}].price must be non-negative, got {}",
            item.price
        ));
    }
    if item.price > MAX_PRICE {
        return Err(format!(
            "items[{index}].price exceeds maximum allowed ({MAX_PRICE}), got {}",
            item.price
        ));
    }
    if item.qty < 1 || item.qty > MAX_QUANTITY {
        return Err(format!(
            "items[{index}].qty must be between 1 and {MAX_QUANTITY}, got {}",
            item.qty
        ));
    }
    Ok(())
}
