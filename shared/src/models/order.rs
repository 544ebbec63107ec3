//! Order Model

use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// ```text
/// pending --(payment)--> preparing --(admin)--> completed
///    |                       |
///    +------(admin)----------+------> cancelled
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Pending,
    Preparing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled orders never change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether an admin status update may move an order from `self` to `next`.
    ///
    /// `pending -> preparing` is deliberately absent: only a successful
    /// payment advances a pending order.
    pub fn admin_can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Preparing, Self::Completed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Preparing, Self::Cancelled)
        )
    }

    /// Customer-facing message sent with every status notification
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Pending => "Your order has been received and is awaiting payment.",
            Self::Preparing => "Your order is being prepared.",
            Self::Completed => "Your order is ready. Enjoy your meal!",
            Self::Cancelled => "Your order has been cancelled.",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line item as stored on the order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Menu item id captured at creation; recipe lookup key
    pub menu_item_id: Option<i64>,
    /// Display name at order time (fallback recipe lookup key)
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

/// Contact details supplied by the customer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Bank account used for a payment attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_number: String,
    pub account_name: String,
    #[serde(default)]
    pub bank_name: Option<String>,
}

/// Outcome of consuming one recipe ingredient for one order line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionStatus {
    /// Stock deducted and still non-negative
    Success,
    /// Stock deducted but driven below zero (deficit recorded)
    Shortfall,
    /// Line had no menu item or no recipe
    Skipped,
    /// Ingredient missing or the stock update failed
    Failed,
}

/// Audit entry written when an order completes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    pub menu_item_name: String,
    pub ingredient_name: Option<String>,
    pub consumed_quantity: f64,
    pub unit: Option<String>,
    pub remaining_stock_after: Option<f64>,
    pub status: ConsumptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// Human-readable, time-derived label (not unique)
    pub order_id: String,
    pub daily_order_number: i64,
    /// Calendar day (YYYY-MM-DD) partitioning `daily_order_number`
    pub order_date: String,
    pub items: Vec<OrderItem>,
    pub contact: ContactInfo,
    pub bank_details: Option<BankDetails>,
    pub total_price: f64,
    pub is_paid: bool,
    pub paid_at: Option<i64>,
    pub transaction_id: Option<String>,
    pub payment_error: Option<String>,
    pub payment_attempts: i32,
    pub order_status: OrderStatus,
    pub ingredient_consumption: Vec<ConsumptionRecord>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

// =============================================================================
// Request / response payloads
// =============================================================================

/// Line item as submitted by the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// Menu item id
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub price: f64,
    pub qty: i32,
}

/// Create order payload
///
/// Any client-side total is ignored; the server computes it from the lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItemInput>,
    pub contact: ContactInfo,
}

/// Payment submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub bank_details: BankDetails,
}

/// Admin status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Public tracking view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderTracking {
    pub order_status: OrderStatus,
    pub daily_order_number: i64,
}

/// Admin order list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    /// Calendar day (YYYY-MM-DD)
    pub date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
