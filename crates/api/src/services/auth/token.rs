//! JWT issuing and verification.
//!
//! Tokens are HS256-signed bearer tokens carrying the user id, email and
//! role. Expiry is controlled by `KIOSK_TOKEN_TTL_HOURS`.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kiosk_core::{Role, UserId};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn new(user_id: UserId, email: &str, role: Role, ttl_hours: i64) -> Self {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(ttl_hours);
        Self {
            sub: user_id.to_string(),
            email: email.to_owned(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Parse the subject back into a typed user id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the subject is not a UUID.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Sign claims into a compact token string.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if encoding fails.
pub fn sign(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Verify a token's signature and expiry, returning its claims.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` for any malformed, expired or
/// tampered token.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-characters-long";

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let user_id = UserId::generate();
        let claims = Claims::new(user_id, "a@example.com", Role::Customer, 24);
        let token = sign(&claims, SECRET).unwrap();

        let decoded = verify(&token, SECRET).unwrap();
        assert_eq!(decoded.user_id().unwrap(), user_id);
        assert_eq!(decoded.email, "a@example.com");
        assert_eq!(decoded.role, Role::Customer);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new(UserId::generate(), "a@example.com", Role::Admin, 24);
        let token = sign(&claims, SECRET).unwrap();

        assert!(verify(&token, "another-secret-also-32-characters!!").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issued 48 hours in the past with a -24h TTL, well beyond leeway.
        let mut claims = Claims::new(UserId::generate(), "a@example.com", Role::Customer, 24);
        claims.iat -= 48 * 3600;
        claims.exp -= 48 * 3600;
        let token = sign(&claims, SECRET).unwrap();

        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let claims = Claims::new(UserId::generate(), "a@example.com", Role::Customer, 24);
        let token = sign(&claims, SECRET).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        // Flip a character in the payload.
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();

        assert!(verify(&parts.join("."), SECRET).is_err());
    }

    #[test]
    fn test_bad_subject_rejected() {
        let mut claims = Claims::new(UserId::generate(), "a@example.com", Role::Customer, 24);
        claims.sub = "not-a-uuid".to_string();
        assert!(claims.user_id().is_err());
    }
}
