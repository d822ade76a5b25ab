//! Review handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use kiosk_core::ProductId;

use crate::db::{ProductRepository, RepositoryError, ReviewRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Review;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", post(create))
        .route("/api/reviews/product/{id}", get(list_for_product))
        .route("/api/reviews/product/{id}/average", get(average))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub product_id: ProductId,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Add a review. One per user per product.
///
/// # Errors
///
/// 400 for a rating outside 1-5 or a repeat review, 404 for an unknown
/// product.
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".to_string()));
    }

    ProductRepository::new(state.pool())
        .get(body.product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("product not found".to_string()),
            other => other.into(),
        })?;

    let repo = ReviewRepository::new(state.pool());
    if repo.exists(user.id, body.product_id).await? {
        return Err(AppError::BadRequest(
            "you have already reviewed this product".to_string(),
        ));
    }

    let review = repo
        .create(user.id, body.product_id, body.rating, body.comment.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Reviews for a product, newest first.
async fn list_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;
    Ok(Json(reviews))
}

/// Mean rating for a product, 0.0 when it has no reviews.
async fn average(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;
    let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
    Ok(Json(json!({ "average": average_rating(&ratings) })))
}

/// Arithmetic mean of the ratings; 0.0 for an empty slice.
fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let sum: f64 = ratings.iter().map(|&r| f64::from(r)).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = ratings.len() as f64;
    sum / count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_none_is_zero() {
        assert!((average_rating(&[]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_of_some() {
        assert!((average_rating(&[5]) - 5.0).abs() < f64::EPSILON);
        assert!((average_rating(&[1, 2, 3, 4, 5]) - 3.0).abs() < f64::EPSILON);
        assert!((average_rating(&[4, 5]) - 4.5).abs() < f64::EPSILON);
    }
}
