//! Cart models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kiosk_core::{CartId, CartItemId, ProductId, UserId};

use super::Product;

/// A cart row. Exactly one exists per user, created lazily.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line. `(cart_id, product_id)` is unique; duplicate adds
/// merge quantities instead of appending a second line.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// The cart as returned by the API: lines with their product attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartLine>,
}

/// One line of a [`CartView`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
}
