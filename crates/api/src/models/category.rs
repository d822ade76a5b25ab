//! Category model and tree shape.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kiosk_core::CategoryId;

/// A category row (adjacency part of the hierarchy).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its recursively nested children, as returned by
/// `GET /api/categories/tree`.
#[derive(Debug, Serialize)]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryTree>,
}
