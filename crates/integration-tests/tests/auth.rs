//! Integration tests for registration, login, and profile management.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p kiosk-api)
//!
//! Run with: cargo test -p kiosk-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use kiosk_integration_tests::{base_url, client, login, register_user};

// ============================================================================
// Registration & Login
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn register_then_login_roundtrip() {
    let client = client();
    let user = register_user(&client).await;

    // The register response never includes a token; login does.
    assert!(!user.token.is_empty());

    let resp = client
        .get(format!("{}/api/auth/profile", base_url()))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), StatusCode::OK);

    let profile: Value = resp.json().await.expect("Failed to parse profile");
    assert_eq!(profile["email"].as_str().unwrap(), user.email);
    assert_eq!(profile["role"].as_str().unwrap(), "customer");
    // The password hash must never leak through the API.
    assert!(profile.get("passwordHash").is_none());
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn duplicate_registration_conflicts() {
    let client = client();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": user.email,
            "password": "another-pass-1",
            "firstName": "Dup",
            "lastName": "User",
        }))
        .send()
        .await
        .expect("Failed to send duplicate register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn wrong_password_is_unauthorized() {
    let client = client();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": user.email, "password": "not-the-password" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Unknown accounts get the same answer as bad passwords.
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": "nobody@example.com", "password": "whatever-1" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn profile_requires_bearer_token() {
    let client = client();

    let resp = client
        .get(format!("{}/api/auth/profile", base_url()))
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/api/auth/profile", base_url()))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Profile Updates & Password Rotation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn update_profile_and_change_password() {
    let client = client();
    let user = register_user(&client).await;

    let resp = client
        .patch(format!("{}/api/users/profile", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({ "firstName": "Renamed", "phone": "+1 555 0100" }))
        .send()
        .await
        .expect("Failed to patch profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Failed to parse profile");
    assert_eq!(updated["firstName"].as_str().unwrap(), "Renamed");
    assert_eq!(updated["phone"].as_str().unwrap(), "+1 555 0100");
    // Untouched fields survive a partial update.
    assert_eq!(updated["lastName"].as_str().unwrap(), "Tester");

    let new_password = "rotated-pass-2";
    let resp = client
        .post(format!("{}/api/users/change-password", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({
            "currentPassword": user.password,
            "newPassword": new_password,
        }))
        .send()
        .await
        .expect("Failed to change password");
    assert_eq!(resp.status(), StatusCode::OK);

    // Old password no longer works, new one does.
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": user.email, "password": user.password }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    login(&client, &user.email, new_password).await;
}
