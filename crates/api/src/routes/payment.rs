//! Payment handlers: intent creation and the provider webhook.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::json;

use kiosk_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::services::payment::{WebhookEvent, verify_signature};
use crate::state::AppState;

/// Header carrying the provider's event signature.
const SIGNATURE_HEADER: &str = "webhook-signature";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/payment/intent/{orderId}", post(create_intent))
        .route("/api/payment/webhook", post(webhook))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
}

/// Create a provider payment intent for a pending order the caller owns.
///
/// # Errors
///
/// 404 when the order is not the caller's, 400 when it is no longer
/// pending, 502 when the provider rejects the request.
async fn create_intent(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<CreateIntentResponse>, AppError> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_for_user(order_id, user.id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("order not found".to_string()),
            other => other.into(),
        })?;

    if order.status != OrderStatus::Pending {
        return Err(AppError::BadRequest(format!(
            "order is {}, only pending orders can be paid",
            order.status
        )));
    }

    let intent = state
        .payment()
        .create_intent(order.total, order.id, user.id)
        .await?;
    repo.set_payment_intent(order.id, &intent.id).await?;

    Ok(Json(CreateIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Inbound provider events. Unauthenticated but signature-verified
/// against the raw body; any verification failure is a 400 with no
/// state change.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing webhook signature".to_string()))?;

    let secret = state.config().payment.webhook_secret.expose_secret();
    verify_signature(signature, &body, secret, chrono::Utc::now().timestamp())
        .map_err(|_| AppError::BadRequest("invalid webhook signature".to_string()))?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed webhook payload: {e}")))?;

    let new_status = match event.event_type.as_str() {
        "payment_intent.succeeded" => Some(OrderStatus::Paid),
        "payment_intent.payment_failed" => Some(OrderStatus::Cancelled),
        other => {
            tracing::debug!(event_type = other, "ignoring webhook event");
            None
        }
    };

    if let Some(status) = new_status {
        apply_intent_outcome(&state, &event, status).await?;
    }

    Ok(Json(json!({ "received": true })))
}

/// Resolve the order an intent event refers to and move it to `status`.
///
/// Resolution prefers the `orderId` the intent was created with in its
/// metadata, falling back to the stored intent id for events whose
/// metadata was stripped. Events that resolve to no order are logged
/// and acknowledged; the provider retries on non-2xx and the event
/// would never become processable.
async fn apply_intent_outcome(
    state: &AppState,
    event: &WebhookEvent,
    status: OrderStatus,
) -> Result<(), AppError> {
    let repo = OrderRepository::new(state.pool());

    let metadata_id = event
        .data
        .object
        .metadata
        .get("orderId")
        .and_then(|raw| raw.parse::<OrderId>().ok());
    let order_id = match metadata_id {
        Some(id) => id,
        None => match repo.find_by_payment_intent(&event.data.object.id).await? {
            Some(order) => order.id,
            None => {
                tracing::warn!(
                    intent = %event.data.object.id,
                    event_type = %event.event_type,
                    "webhook event carries no usable order reference"
                );
                return Ok(());
            }
        },
    };

    match repo.set_status(order_id, status).await {
        Ok(order) => {
            tracing::info!(
                order = %order.id,
                status = %order.status,
                intent = %event.data.object.id,
                "order status updated from webhook"
            );
            Ok(())
        }
        Err(RepositoryError::NotFound) => {
            tracing::warn!(
                order = %order_id,
                intent = %event.data.object.id,
                "webhook references unknown order"
            );
            Ok(())
        }
        Err(other) => Err(other.into()),
    }
}
