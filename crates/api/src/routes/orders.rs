//! Order handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::Deserialize;

use kiosk_core::{OrderId, OrderStatus, ProductId};

use crate::db::orders::NewOrderItem;
use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Order, OrderView};
use crate::services::orders::{order_total, unit_price};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create).get(list_own))
        .route("/api/orders/admin/all", get(list_all))
        .route("/api/orders/{id}", get(get_own))
        .route("/api/orders/{id}/status", patch(set_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// Checkout: freeze current prices into an order and decrement stock.
///
/// Stock is checked and decremented line by line; a failure partway
/// rolls the transaction back.
///
/// # Errors
///
/// 400 for empty or invalid lines and insufficient stock, 404 for an
/// unknown product.
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>), AppError> {
    if body.items.is_empty() {
        return Err(AppError::BadRequest("order must contain at least one item".to_string()));
    }

    let products = ProductRepository::new(state.pool());
    let mut lines = Vec::with_capacity(body.items.len());
    for item in &body.items {
        if item.quantity < 1 {
            return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
        }
        let product = products.get(item.product_id).await.map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("product {} not found", item.product_id))
            }
            other => other.into(),
        })?;
        if item.quantity > product.stock {
            return Err(AppError::BadRequest(format!(
                "insufficient stock for \"{}\"",
                product.name
            )));
        }
        lines.push(NewOrderItem {
            product_id: product.id,
            quantity: item.quantity,
            price: unit_price(&product),
        });
    }

    let total = order_total(&lines);
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .create(user.id, total, body.shipping_address.as_deref(), &lines)
        .await?;
    let items = repo.items(order.id).await?;

    Ok((StatusCode::CREATED, Json(OrderView { order, items })))
}

/// The caller's orders, newest first, with line items.
async fn list_own(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_for_user(user.id).await?;
    let views = with_items(&repo, orders).await?;
    Ok(Json(views))
}

/// Every order in the system (admin).
async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_all().await?;
    let views = with_items(&repo, orders).await?;
    Ok(Json(views))
}

/// An order by id, visible only to its owner.
async fn get_own(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>, AppError> {
    let repo = OrderRepository::new(state.pool());
    let order = repo.get_for_user(id, user.id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("order not found".to_string()),
        other => other.into(),
    })?;
    let items = repo.items(order.id).await?;
    Ok(Json(OrderView { order, items }))
}

/// Overwrite an order's status (admin). Transitions are unrestricted.
async fn set_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool())
        .set_status(id, body.status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("order not found".to_string()),
            other => other.into(),
        })?;
    Ok(Json(order))
}

async fn with_items(
    repo: &OrderRepository<'_>,
    orders: Vec<Order>,
) -> Result<Vec<OrderView>, AppError> {
    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let items = repo.items(order.id).await?;
        views.push(OrderView { order, items });
    }
    Ok(views)
}
