//! Shipping address handlers. All bearer-gated and owner-scoped.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use kiosk_core::AddressId;

use crate::db::AddressRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Address;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/addresses", get(list).post(create))
        .route(
            "/api/addresses/{id}",
            get(get_by_id).patch(update).delete(remove),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub is_default: Option<bool>,
}

/// The caller's addresses, default first.
async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Address>>, AppError> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(addresses))
}

async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>, AppError> {
    let address = AddressRepository::new(state.pool())
        .get_for_user(id, user.id)
        .await?;
    Ok(Json(address))
}

/// Add an address. Marking it default unsets the previous default
/// first.
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    let address = AddressRepository::new(state.pool())
        .create(
            user.id,
            &body.street,
            &body.city,
            &body.state,
            &body.country,
            &body.zip_code,
            body.is_default,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(body): Json<UpdateAddressRequest>,
) -> Result<Json<Address>, AppError> {
    let address = AddressRepository::new(state.pool())
        .update(
            id,
            user.id,
            body.street.as_deref(),
            body.city.as_deref(),
            body.state.as_deref(),
            body.country.as_deref(),
            body.zip_code.as_deref(),
            body.is_default,
        )
        .await?;
    Ok(Json(address))
}

async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<StatusCode, AppError> {
    AddressRepository::new(state.pool())
        .delete_for_user(id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
