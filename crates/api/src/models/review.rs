//! Review model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kiosk_core::{ProductId, ReviewId, UserId};

/// A product review. One per (user, product) pair.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
