//! Catalog handlers.
//!
//! Reads are public; writes require the admin role. The listing endpoint
//! carries the full filter surface: substring search, direct category
//! match, price bounds, featured flag, whitelisted sorting and capped
//! pagination.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use kiosk_core::{CategoryId, ProductId, slugify};

use crate::db::products::{ProductFilter, ProductSort};
use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{Page, Product, ProductWithCategories};
use crate::state::AppState;

/// Listing defaults and caps.
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_FEATURED_LIMIT: i64 = 8;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/featured", get(featured))
        .route("/api/products/category/{id}", get(by_category))
        .route("/api/products/slug/{slug}", get(get_by_slug))
        .route(
            "/api/products/{id}",
            get(get_by_id).patch(update).delete(remove),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_featured: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    pub sku: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    pub attributes: Option<serde_json::Value>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    pub attributes: Option<serde_json::Value>,
    pub category_ids: Option<Vec<CategoryId>>,
}

/// Map a caller-supplied sort field to the whitelist, rejecting
/// anything else.
fn parse_sort(field: Option<&str>) -> Result<ProductSort, AppError> {
    match field {
        None | Some("createdAt") => Ok(ProductSort::CreatedAt),
        Some("name") => Ok(ProductSort::Name),
        Some("price") => Ok(ProductSort::Price),
        Some("stock") => Ok(ProductSort::Stock),
        Some(other) => Err(AppError::BadRequest(format!("unknown sort field: {other}"))),
    }
}

/// Ascending only on an explicit `asc`; everything defaults descending.
fn parse_ascending(dir: Option<&str>) -> Result<bool, AppError> {
    match dir {
        None | Some("desc" | "DESC") => Ok(false),
        Some("asc" | "ASC") => Ok(true),
        Some(other) => Err(AppError::BadRequest(format!(
            "unknown sort direction: {other}"
        ))),
    }
}

/// Clamp the page size into `1..=MAX_PAGE_SIZE`.
fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Filtered, paginated product listing.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Product>>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = clamp_limit(query.limit);

    let filter = ProductFilter {
        category_id: query.category_id,
        search: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
        is_featured: query.is_featured,
        include_inactive: false,
        sort: parse_sort(query.sort_by.as_deref())?,
        ascending: parse_ascending(query.sort_dir.as_deref())?,
    };

    let offset = i64::from(page - 1) * i64::from(limit);
    let (items, total) = ProductRepository::new(state.pool())
        .find_all(&filter, offset, i64::from(limit))
        .await?;

    Ok(Json(Page {
        items,
        total,
        page,
        limit,
    }))
}

/// Featured, active products.
async fn featured(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_FEATURED_LIMIT).clamp(1, 100);
    let products = ProductRepository::new(state.pool()).find_featured(limit).await?;
    Ok(Json(products))
}

/// Products in a category and all of its descendants.
async fn by_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Product>>, AppError> {
    let categories = CategoryRepository::new(state.pool());
    categories.get(id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("category not found".to_string()),
        other => other.into(),
    })?;

    // The subtree's ids, the category itself included.
    let ids = categories.descendant_ids(id).await?;
    let products = ProductRepository::new(state.pool())
        .find_by_categories(&ids)
        .await?;
    Ok(Json(products))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductWithCategories>, AppError> {
    let repo = ProductRepository::new(state.pool());
    let product = repo.get(id).await?;
    let categories = repo.categories_of(product.id).await?;
    Ok(Json(ProductWithCategories {
        product,
        categories,
    }))
}

async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductWithCategories>, AppError> {
    let repo = ProductRepository::new(state.pool());
    let product = repo.get_by_slug(&slug).await?;
    let categories = repo.categories_of(product.id).await?;
    Ok(Json(ProductWithCategories {
        product,
        categories,
    }))
}

/// Create a product (admin).
///
/// # Errors
///
/// 409 on a duplicate name, 404 when any referenced category is unknown.
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    check_categories_exist(&state, &body.category_ids).await?;

    let slug = slugify(&body.name);
    let product = ProductRepository::new(state.pool())
        .create(
            &body.name,
            &slug,
            body.description.as_deref().unwrap_or_default(),
            body.price,
            body.sale_price,
            body.stock,
            body.sku.as_deref(),
            &body.image_urls,
            body.is_featured,
            body.attributes.as_ref(),
            &body.category_ids,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin). A provided `categoryIds` replaces the
/// whole category set.
async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    if let Some(ref ids) = body.category_ids {
        check_categories_exist(&state, ids).await?;
    }

    let slug = body.name.as_deref().map(slugify);
    let product = ProductRepository::new(state.pool())
        .update(
            id,
            body.name.as_deref(),
            slug.as_deref(),
            body.description.as_deref(),
            body.price,
            body.sale_price,
            body.stock,
            body.sku.as_deref(),
            body.image_urls.as_deref(),
            body.is_featured,
            body.is_active,
            body.attributes.as_ref(),
            body.category_ids.as_deref(),
        )
        .await?;
    Ok(Json(product))
}

async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn check_categories_exist(
    state: &AppState,
    ids: &[CategoryId],
) -> Result<(), AppError> {
    let categories = CategoryRepository::new(state.pool());
    for &id in ids {
        categories.get(id).await.map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("category {id} not found"))
            }
            other => other.into(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_whitelist() {
        assert_eq!(parse_sort(None).unwrap(), ProductSort::CreatedAt);
        assert_eq!(parse_sort(Some("name")).unwrap(), ProductSort::Name);
        assert_eq!(parse_sort(Some("price")).unwrap(), ProductSort::Price);
        assert_eq!(parse_sort(Some("stock")).unwrap(), ProductSort::Stock);
        assert!(parse_sort(Some("password_hash")).is_err());
        assert!(parse_sort(Some("created_at; DROP TABLE products")).is_err());
    }

    #[test]
    fn test_sort_direction() {
        assert!(!parse_ascending(None).unwrap());
        assert!(!parse_ascending(Some("desc")).unwrap());
        assert!(parse_ascending(Some("asc")).unwrap());
        assert!(parse_ascending(Some("sideways")).is_err());
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(10_000)), MAX_PAGE_SIZE);
    }
}
