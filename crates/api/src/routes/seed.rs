//! Development bootstrap: create the configured admin account.

use axum::{Json, Router, extract::State, routing::post};
use secrecy::ExposeSecret;
use serde_json::json;

use kiosk_core::Role;

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::services::auth::hash_password;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/seed/admin", post(seed_admin))
}

/// Create the bootstrap admin from `SEED_ADMIN_EMAIL` /
/// `SEED_ADMIN_PASSWORD` if it does not exist yet. Idempotent.
///
/// # Errors
///
/// 400 when no seed password is configured.
async fn seed_admin(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let config = &state.config().seed_admin;
    let Some(ref password) = config.password else {
        return Err(AppError::BadRequest(
            "seed admin password is not configured".to_string(),
        ));
    };

    let users = UserRepository::new(state.pool());
    if users.get_by_email(&config.email).await?.is_some() {
        return Ok(Json(json!({ "message": "admin already exists" })));
    }

    let password_hash = hash_password(password.expose_secret())
        .map_err(|_| AppError::Internal("password hashing failed".to_string()))?;
    let user = users
        .create(&config.email, &password_hash, "Admin", "User", None, Role::Admin)
        .await?;

    tracing::info!(email = %config.email, "bootstrap admin created");
    Ok(Json(json!({ "message": "admin created", "id": user.id })))
}
