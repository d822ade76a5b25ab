//! Stripe-compatible payment intents client.

use kiosk_core::{OrderId, UserId};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::PaymentConfig;

use super::PaymentError;

/// Currency used for all intents.
const CURRENCY: &str = "usd";

/// A payment intent as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Secret handed to the frontend to confirm the payment.
    pub client_secret: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

/// HTTP client for the payment provider's REST API.
#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: secrecy::SecretString,
}

impl PaymentClient {
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.clone(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Create a payment intent for an order.
    ///
    /// The amount is sent in minor units (cents) per the provider's
    /// convention; the order id rides along as metadata so webhook events
    /// can be traced back.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Provider` for non-2xx responses and
    /// `PaymentError::InvalidAmount` if the total has sub-cent precision.
    pub async fn create_intent(
        &self,
        amount: Decimal,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<PaymentIntent, PaymentError> {
        let minor_units = to_minor_units(amount)?.to_string();
        let order_id = order_id.to_string();
        let user_id = user_id.to_string();
        let params: [(&str, &str); 5] = [
            ("amount", &minor_units),
            ("currency", CURRENCY),
            ("metadata[orderId]", &order_id),
            ("metadata[userId]", &user_id),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ProviderErrorBody = response.json().await.unwrap_or(ProviderErrorBody {
                error: None,
            });
            let message = body
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "unknown provider error".to_string());
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Convert a decimal amount to integer minor units (cents).
///
/// # Errors
///
/// Returns `PaymentError::InvalidAmount` for negative amounts or amounts
/// with more than two decimal places.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PaymentError> {
    if amount.is_sign_negative() {
        return Err(PaymentError::InvalidAmount(amount.to_string()));
    }
    let cents = amount * Decimal::ONE_HUNDRED;
    if cents.fract() != Decimal::ZERO {
        return Err(PaymentError::InvalidAmount(amount.to_string()));
    }
    cents
        .try_into()
        .map_err(|_| PaymentError::InvalidAmount(amount.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_dollars_to_cents() {
        assert_eq!(to_minor_units(Decimal::new(1999, 2)).unwrap(), 1999);
        assert_eq!(to_minor_units(Decimal::new(100, 0)).unwrap(), 10000);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_sub_cent_precision_rejected() {
        assert!(to_minor_units(Decimal::new(1999, 3)).is_err());
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(to_minor_units(Decimal::new(-500, 2)).is_err());
    }
}
