//! User profile handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch, post},
};
use serde::Deserialize;

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/profile", get(get_profile))
        .route("/api/users/profile", patch(update_profile))
        .route("/api/users/change-password", post(change_password))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

async fn get_profile(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = UserRepository::new(state.pool()).get_by_id(current.id).await?;
    Ok(Json(user))
}

/// Update name and phone. Absent fields are left untouched.
async fn update_profile(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let user = UserRepository::new(state.pool())
        .update_profile(
            current.id,
            body.first_name.as_deref(),
            body.last_name.as_deref(),
            body.phone.as_deref(),
        )
        .await?;
    Ok(Json(user))
}

/// Rotate the password after verifying the current one.
///
/// # Errors
///
/// 401 when the current password is wrong, 400 when the new one is too
/// short.
async fn change_password(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = AuthService::new(state.pool(), state.config());
    service
        .change_password(current.id, &body.current_password, &body.new_password)
        .await?;
    Ok(Json(serde_json::json!({ "message": "password updated" })))
}
