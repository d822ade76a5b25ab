//! Integration tests for kiosk.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p kiosk-cli -- migrate
//!
//! # Start the API server
//! cargo run -p kiosk-api
//!
//! # Run the ignored integration tests
//! cargo test -p kiosk-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `KIOSK_BASE_URL` - API server base URL (default: <http://localhost:3000>)
//! - `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD` - Admin credentials; must
//!   match the server's seed configuration
//! - `PAYMENT_WEBHOOK_SECRET` - Webhook signing secret; must match the server

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("KIOSK_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Plain HTTP client, no auth.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// A registered user plus their bearer token.
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub token: String,
    pub id: String,
}

/// Register a fresh customer account and log in.
pub async fn register_user(client: &Client) -> TestUser {
    let email = format!("it-{}@example.com", Uuid::new_v4());
    let password = "integration-pass-1".to_string();

    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "password": password,
            "firstName": "Integration",
            "lastName": "Tester",
        }))
        .send()
        .await
        .expect("Failed to register test user");
    assert_eq!(resp.status(), 201, "register failed: {}", resp.status());
    let user: Value = resp.json().await.expect("Failed to parse register body");
    let id = user["id"].as_str().expect("user id missing").to_string();

    let token = login(client, &email, &password).await;
    TestUser {
        email,
        password,
        token,
        id,
    }
}

/// Exchange credentials for a bearer token.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), 200, "login failed: {}", resp.status());
    let body: Value = resp.json().await.expect("Failed to parse login body");
    body["accessToken"]
        .as_str()
        .expect("accessToken missing")
        .to_string()
}

/// Bootstrap the seed admin (idempotent) and log in as them.
///
/// Requires `SEED_ADMIN_PASSWORD` in both the server's and the tests'
/// environment.
pub async fn admin_token(client: &Client) -> String {
    let resp = client
        .post(format!("{}/api/seed/admin", base_url()))
        .send()
        .await
        .expect("Failed to seed admin");
    assert_eq!(resp.status(), 200, "seed admin failed: {}", resp.status());

    let email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@kiosk.local".to_string());
    let password = std::env::var("SEED_ADMIN_PASSWORD").expect("SEED_ADMIN_PASSWORD not set");
    login(client, &email, &password).await
}

/// Create a category via the API, returning its id.
pub async fn create_category(client: &Client, admin_token: &str, name: &str) -> String {
    create_child_category(client, admin_token, name, None).await
}

/// Create a category under an optional parent, returning its id.
pub async fn create_child_category(
    client: &Client,
    admin_token: &str,
    name: &str,
    parent_id: Option<&str>,
) -> String {
    let resp = client
        .post(format!("{}/api/categories", base_url()))
        .bearer_auth(admin_token)
        .json(&json!({ "name": name, "parentId": parent_id }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), 201, "create category failed: {}", resp.status());
    let body: Value = resp.json().await.expect("Failed to parse category body");
    body["id"].as_str().expect("category id missing").to_string()
}

/// Create a product via the API, returning the response body.
pub async fn create_product(
    client: &Client,
    admin_token: &str,
    name: &str,
    price: &str,
    stock: i32,
    category_ids: &[&str],
) -> Value {
    let resp = client
        .post(format!("{}/api/products", base_url()))
        .bearer_auth(admin_token)
        .json(&json!({
            "name": name,
            "description": "integration test product",
            "price": price,
            "stock": stock,
            "categoryIds": category_ids,
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), 201, "create product failed: {}", resp.status());
    resp.json().await.expect("Failed to parse product body")
}

/// Unique-ish suffix to keep test fixtures from colliding across runs.
#[must_use]
pub fn unique(name: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    let (short, _) = id.split_at(8);
    format!("{name} {short}")
}
