//! Category handlers.
//!
//! Reads are public; writes require the admin role.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use kiosk_core::{CategoryId, slugify};

use crate::db::{CategoryRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryTree};
use crate::services::categories::build_tree;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route("/api/categories/tree", get(tree))
        .route("/api/categories/slug/{slug}", get(get_by_slug))
        .route("/api/categories/{id}/descendants", get(descendants))
        .route(
            "/api/categories/{id}",
            get(get_by_id).patch(update).delete(remove),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub parent_id: Option<CategoryId>,
}

const fn default_true() -> bool {
    true
}

/// Patch body. `parentId` distinguishes absent (leave alone) from
/// explicit `null` (move to root) via the double `Option`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub parent_id: Option<Option<CategoryId>>,
}

/// Wraps a present field in `Some`, so a missing field deserializes to
/// `None` while an explicit `null` becomes `Some(None)`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Active categories, flat, ordered by name.
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    let categories = CategoryRepository::new(state.pool()).list_active().await?;
    Ok(Json(categories))
}

/// The full category forest.
async fn tree(State(state): State<AppState>) -> Result<Json<Vec<CategoryTree>>, AppError> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    Ok(Json(build_tree(categories)))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryRepository::new(state.pool()).get(id).await?;
    Ok(Json(category))
}

async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryRepository::new(state.pool()).get_by_slug(&slug).await?;
    Ok(Json(category))
}

/// Strict descendants of a category, nearest first.
async fn descendants(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Category>>, AppError> {
    let repo = CategoryRepository::new(state.pool());
    repo.get(id).await?;
    let categories = repo.find_descendants(id).await?;
    Ok(Json(categories))
}

/// Create a category (admin).
///
/// # Errors
///
/// 409 when any category already holds the name, 404 when the parent
/// does not exist.
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let repo = CategoryRepository::new(state.pool());

    if repo.exists_by_name(&body.name).await? {
        return Err(AppError::Conflict(format!(
            "category \"{}\" already exists",
            body.name
        )));
    }
    if let Some(parent) = body.parent_id {
        repo.get(parent).await.map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("parent category not found".to_string())
            }
            other => other.into(),
        })?;
    }

    let slug = slugify(&body.name);
    let category = repo
        .create(
            &body.name,
            &slug,
            body.description.as_deref(),
            body.image_url.as_deref(),
            body.is_active,
            body.parent_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update and optionally re-parent a category (admin).
///
/// # Errors
///
/// 409 when the new parent is the category itself or one of its
/// descendants.
async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let repo = CategoryRepository::new(state.pool());
    repo.get(id).await?;

    // A name change re-derives the slug.
    let slug = body.name.as_deref().map(slugify);
    let category = repo
        .update_fields(
            id,
            body.name.as_deref(),
            slug.as_deref(),
            body.description.as_deref(),
            body.image_url.as_deref(),
            body.is_active,
        )
        .await?;

    if let Some(new_parent) = body.parent_id {
        if let Some(parent) = new_parent {
            let subtree = repo.descendant_ids(id).await?;
            if subtree.contains(&parent) {
                return Err(AppError::Conflict(
                    "cannot move a category under itself or its descendants".to_string(),
                ));
            }
            repo.get(parent).await.map_err(|e| match e {
                RepositoryError::NotFound => {
                    AppError::NotFound("parent category not found".to_string())
                }
                other => other.into(),
            })?;
        }
        repo.reparent(id, new_parent).await?;
        let category = repo.get(id).await?;
        return Ok(Json(category));
    }

    Ok(Json(category))
}

/// Delete a category and its whole subtree (admin).
async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, AppError> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
