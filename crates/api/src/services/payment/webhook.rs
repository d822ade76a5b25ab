//! Webhook event parsing and signature verification.
//!
//! The provider signs each delivery with a header of the form
//! `t=<unix-seconds>,v1=<hex hmac-sha256>`, where the MAC covers
//! `"{t}.{raw body}"`. Verification checks the MAC in constant time and
//! rejects stale timestamps to limit replay.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed clock skew between the signed timestamp and now.
const TOLERANCE_SECS: i64 = 300;

/// A webhook event envelope.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: WebhookObject,
}

/// The payment intent carried inside an event.
#[derive(Debug, Deserialize)]
pub struct WebhookObject {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,
}

/// Verify a signature header against the raw request body.
///
/// # Errors
///
/// Returns `PaymentError::InvalidSignature` when the header is missing a
/// part, the timestamp is outside the tolerance window, or the MAC does
/// not match.
pub fn verify_signature(
    header: &str,
    body: &[u8],
    secret: &str,
    now_unix: i64,
) -> Result<(), PaymentError> {
    let (timestamp, provided_mac) = parse_header(header)?;

    if (now_unix - timestamp).abs() > TOLERANCE_SECS {
        return Err(PaymentError::InvalidSignature);
    }

    let provided = hex::decode(provided_mac).map_err(|_| PaymentError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    // Constant-time comparison via the Mac trait.
    mac.verify_slice(&provided)
        .map_err(|_| PaymentError::InvalidSignature)
}

/// Split a `t=...,v1=...` header into its timestamp and hex MAC.
fn parse_header(header: &str) -> Result<(i64, &str), PaymentError> {
    let mut timestamp = None;
    let mut mac = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => mac = Some(value),
            _ => {}
        }
    }

    match (timestamp, mac) {
        (Some(t), Some(m)) => Ok((t, m)),
        _ => Err(PaymentError::InvalidSignature),
    }
}

/// Compute the signature header for a body, used by tests and the CLI's
/// webhook replay command.
#[must_use]
#[allow(clippy::missing_panics_doc)]
pub fn sign_payload(body: &[u8], secret: &str, timestamp: i64) -> String {
    // HMAC accepts keys of any length, so new_from_slice cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    let digest = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={digest}")
}
