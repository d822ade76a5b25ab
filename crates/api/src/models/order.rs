//! Order models.
//!
//! Order items and totals are frozen at creation time. Later product
//! price changes never touch an existing order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use kiosk_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// An order row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line with the unit price captured at order time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// An order with its line items, as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
