//! Webhook signing and replay commands.
//!
//! Useful when debugging payment webhook handling locally: capture an
//! event body from the provider dashboard, then re-sign and deliver it
//! to a running server with a fresh timestamp.
//!
//! # Environment Variables
//!
//! - `PAYMENT_WEBHOOK_SECRET` - Webhook signing secret shared with the server

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::info;

use kiosk_api::services::payment::webhook::sign_payload;

/// Errors that can occur while signing or replaying a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signing secret missing from the environment.
    #[error("Missing environment variable: PAYMENT_WEBHOOK_SECRET")]
    MissingSecret,

    /// Payload file could not be read.
    #[error("Failed to read payload file: {0}")]
    Io(#[from] std::io::Error),

    /// Delivery to the server failed.
    #[error("Delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server rejected the event.
    #[error("Server rejected the event with status {0}: {1}")]
    Rejected(u16, String),
}

/// Sign a payload file and POST it to `{url}/api/payment/webhook`.
///
/// # Errors
///
/// Returns `WebhookError` if the secret is missing, the file cannot be
/// read, or the server rejects the event.
pub async fn replay(file: &str, url: &str) -> Result<(), WebhookError> {
    dotenvy::dotenv().ok();

    let secret = webhook_secret()?;
    let body = tokio::fs::read(file).await?;
    let header = sign_payload(&body, &secret, now_unix());

    let endpoint = format!("{}/api/payment/webhook", url.trim_end_matches('/'));
    info!(endpoint = %endpoint, "Delivering webhook event");

    let response = reqwest::Client::new()
        .post(&endpoint)
        .header("Webhook-Signature", &header)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(WebhookError::Rejected(status.as_u16(), text));
    }

    info!("Delivered: {status} {text}");
    Ok(())
}

/// Print the signature header for a payload file, for use with curl.
///
/// # Errors
///
/// Returns `WebhookError` if the secret is missing or the file cannot
/// be read.
pub async fn sign(file: &str) -> Result<(), WebhookError> {
    dotenvy::dotenv().ok();

    let secret = webhook_secret()?;
    let body = tokio::fs::read(file).await?;
    let header = sign_payload(&body, &secret, now_unix());

    #[allow(clippy::print_stdout)]
    {
        println!("Webhook-Signature: {header}");
    }
    Ok(())
}

fn webhook_secret() -> Result<String, WebhookError> {
    std::env::var("PAYMENT_WEBHOOK_SECRET").map_err(|_| WebhookError::MissingSecret)
}

#[allow(clippy::cast_possible_wrap)]
fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}
