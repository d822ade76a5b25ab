//! Registration, login and profile handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(profile))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

/// Create a new customer account.
///
/// # Errors
///
/// 409 when the email is already registered, 400 for invalid email or a
/// too-short password.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let service = AuthService::new(state.pool(), state.config());
    let auth = service
        .register(
            &body.email,
            &body.password,
            &body.first_name,
            &body.last_name,
            body.phone.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(auth.user)))
}

/// Exchange credentials for a bearer token.
///
/// # Errors
///
/// 401 on wrong credentials or a deactivated account.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let service = AuthService::new(state.pool(), state.config());
    let auth = service.login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        access_token: auth.token,
        user: auth.user,
    }))
}

/// The authenticated user, freshly loaded.
///
/// # Errors
///
/// 401 when the token is invalid or the account has been deactivated
/// since the token was issued.
async fn profile(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = UserRepository::new(state.pool()).get_by_id(current.id).await?;
    if !user.is_active {
        return Err(AppError::Unauthorized("account is disabled".to_string()));
    }
    Ok(Json(user))
}
