//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (database ping)
//!
//! # Auth
//! POST /api/auth/register                   - Create an account
//! POST /api/auth/login                      - Exchange credentials for a bearer token
//! GET  /api/auth/profile                    - Authenticated user
//!
//! # Users
//! GET  /api/users/profile                   - Authenticated user
//! PATCH /api/users/profile                  - Update name/phone
//! POST /api/users/change-password           - Rotate password
//!
//! # Categories (writes admin-only)
//! GET  /api/categories                      - Active categories, flat
//! POST /api/categories                      - Create
//! GET  /api/categories/tree                 - Full tree
//! GET  /api/categories/slug/{slug}          - Lookup by slug
//! GET  /api/categories/{id}                 - Lookup by id
//! GET  /api/categories/{id}/descendants     - Strict descendants
//! PATCH /api/categories/{id}                - Update / re-parent
//! DELETE /api/categories/{id}               - Delete (cascades to children)
//!
//! # Products (writes admin-only)
//! GET  /api/products                        - Filtered, paginated listing
//! POST /api/products                        - Create
//! GET  /api/products/featured               - Featured products
//! GET  /api/products/category/{id}          - Category subtree listing
//! GET  /api/products/slug/{slug}            - Lookup by slug
//! GET  /api/products/{id}                   - Lookup by id
//! PATCH /api/products/{id}                  - Update
//! DELETE /api/products/{id}                 - Delete
//!
//! # Cart (bearer)
//! GET  /api/cart                            - Current cart (created lazily)
//! POST /api/cart                            - Add a product
//! PATCH /api/cart/update/{productId}        - Set line quantity
//! DELETE /api/cart/remove/{productId}       - Remove a line
//! DELETE /api/cart/clear                    - Empty the cart
//!
//! # Orders
//! POST /api/orders                          - Checkout
//! GET  /api/orders                          - Own orders
//! GET  /api/orders/admin/all                - All orders (admin)
//! GET  /api/orders/{id}                     - Own order by id
//! PATCH /api/orders/{id}/status             - Set status (admin)
//!
//! # Payment
//! POST /api/payment/intent/{orderId}        - Create a provider payment intent
//! POST /api/payment/webhook                 - Signed provider events
//!
//! # Reviews
//! POST /api/reviews                         - Add a review (bearer)
//! GET  /api/reviews/product/{id}            - Reviews for a product
//! GET  /api/reviews/product/{id}/average    - Mean rating
//!
//! # Addresses (bearer)
//! GET  /api/addresses                       - Own addresses
//! POST /api/addresses                       - Add
//! GET  /api/addresses/{id}                  - Lookup
//! PATCH /api/addresses/{id}                 - Update
//! DELETE /api/addresses/{id}                - Delete
//!
//! # Seed
//! POST /api/seed/admin                      - Bootstrap the configured admin
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod payment;
pub mod products;
pub mod reviews;
pub mod seed;
pub mod users;

use axum::{Json, Router, extract::State, routing::get};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Build the full application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .merge(auth::router())
        .merge(users::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(payment::router())
        .merge(reviews::router())
        .merge(addresses::router())
        .merge(seed::router())
}

/// Liveness check.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness check: verifies the database answers a trivial query.
async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(|e| AppError::Internal(format!("database not ready: {e}")))?;
    Ok(Json(json!({ "status": "ready" })))
}
