//! Product model and paginated listing shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use kiosk_core::ProductId;

use super::Category;

/// A product row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub image_urls: Vec<String>,
    pub attributes: Option<serde_json::Value>,
    pub sku: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product with its directly associated categories attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategories {
    #[serde(flatten)]
    pub product: Product,
    pub categories: Vec<Category>,
}

/// One page of a filtered catalog listing.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}
