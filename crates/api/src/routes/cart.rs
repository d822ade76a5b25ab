//! Cart handlers. All bearer-gated.
//!
//! Stock is not checked at cart time; checkout is where availability is
//! enforced.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch},
};
use serde::Deserialize;

use kiosk_core::ProductId;

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{CartLine, CartView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(get_cart).post(add_item))
        .route("/api/cart/update/{productId}", patch(update_item))
        .route("/api/cart/remove/{productId}", delete(remove_item))
        .route("/api/cart/clear", delete(clear))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// The user's cart, created empty on first access.
async fn get_cart(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<CartView>, AppError> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    let view = load_view(&repo, cart.id).await?;
    Ok(Json(view))
}

/// Add a product. An existing line for the same product has its
/// quantity incremented instead of duplicating the line.
async fn add_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>, AppError> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    ProductRepository::new(state.pool())
        .get(body.product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("product not found".to_string()),
            other => other.into(),
        })?;

    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    repo.add_item(cart.id, body.product_id, body.quantity).await?;

    let view = load_view(&repo, cart.id).await?;
    Ok(Json(view))
}

/// Set a line's quantity to an absolute value.
async fn update_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, AppError> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    repo.update_item_quantity(cart.id, product_id, body.quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("product is not in the cart".to_string())
            }
            other => other.into(),
        })?;

    let view = load_view(&repo, cart.id).await?;
    Ok(Json(view))
}

async fn remove_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>, AppError> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    repo.remove_item(cart.id, product_id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("product is not in the cart".to_string()),
        other => other.into(),
    })?;

    let view = load_view(&repo, cart.id).await?;
    Ok(Json(view))
}

async fn clear(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    repo.clear(cart.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_view(
    repo: &CartRepository<'_>,
    cart_id: kiosk_core::CartId,
) -> Result<CartView, AppError> {
    let lines = repo.items_with_products(cart_id).await?;
    Ok(CartView {
        id: cart_id,
        items: lines
            .into_iter()
            .map(|(item, product)| CartLine {
                product,
                quantity: item.quantity,
            })
            .collect(),
    })
}
