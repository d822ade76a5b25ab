//! Payment provider integration.
//!
//! A thin client for a Stripe-compatible payment intents API, plus
//! verification of the provider's signed webhook events.

mod client;
pub mod webhook;

pub use client::{PaymentClient, PaymentIntent};
pub use webhook::{WebhookEvent, verify_signature};

use thiserror::Error;

/// Errors that can occur when interacting with the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Provider rejected the request.
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// Webhook signature header missing, malformed, stale, or wrong.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Amount cannot be represented in minor units.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
