//! Shipping address model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kiosk_core::{AddressId, UserId};

/// A user-owned shipping address. At most one per user carries
/// `is_default = true`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
