//! Integration tests for the cart, checkout, and payment webhook flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p kiosk-api)
//! - `SEED_ADMIN_PASSWORD` and `PAYMENT_WEBHOOK_SECRET` matching the server
//!
//! Run with: cargo test -p kiosk-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use kiosk_api::services::payment::webhook::sign_payload;
use kiosk_integration_tests::{
    admin_token, base_url, client, create_product, register_user, unique,
};

async fn add_to_cart(client: &Client, token: &str, product_id: &str, quantity: i32) -> Value {
    let resp = client
        .post(format!("{}/api/cart", base_url()))
        .bearer_auth(token)
        .json(&json!({ "productId": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK, "add to cart failed");
    resp.json().await.expect("Failed to parse cart")
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn cart_merges_duplicate_lines() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = register_user(&client).await;

    let product = create_product(&client, &admin, &unique("Mug"), "12.00", 50, &[]).await;
    let product_id = product["id"].as_str().unwrap();

    // First read creates the cart lazily.
    let resp = client
        .get(format!("{}/api/cart", base_url()))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to fetch cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert!(cart["items"].as_array().unwrap().is_empty());

    add_to_cart(&client, &user.token, product_id, 2).await;
    let cart = add_to_cart(&client, &user.token, product_id, 3).await;

    // Same product twice merges into one line.
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"].as_i64(), Some(5));

    // Set the quantity directly, then remove the line.
    let resp = client
        .patch(format!("{}/api/cart/update/{product_id}", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .expect("Failed to update quantity");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["items"][0]["quantity"].as_i64(), Some(1));

    let resp = client
        .delete(format!("{}/api/cart/remove/{product_id}", base_url()))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to remove line");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn cart_rejects_unknown_product_and_bad_quantity() {
    let client = client();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/api/cart", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({
            "productId": "00000000-0000-0000-0000-000000000000",
            "quantity": 1,
        }))
        .send()
        .await
        .expect("Failed to send add");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .patch(format!(
            "{}/api/cart/update/00000000-0000-0000-0000-000000000000",
            base_url()
        ))
        .bearer_auth(&user.token)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn checkout_freezes_prices_and_decrements_stock() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = register_user(&client).await;

    let product = create_product(&client, &admin, &unique("Lamp"), "29.99", 10, &[]).await;
    let product_id = product["id"].as_str().unwrap();

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({
            "items": [{ "productId": product_id, "quantity": 2 }],
            "shippingAddress": "1 Integration Way",
        }))
        .send()
        .await
        .expect("Failed to create order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(order["status"].as_str(), Some("pending"));
    assert_eq!(order["total"].as_str(), Some("59.98"));
    assert_eq!(order["items"][0]["price"].as_str(), Some("29.99"));

    // Stock went down by the ordered quantity.
    let resp = client
        .get(format!("{}/api/products/{product_id}", base_url()))
        .send()
        .await
        .expect("Failed to fetch product");
    let fetched: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(fetched["stock"].as_i64(), Some(8));

    // Ordering more than the remaining stock is rejected.
    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({
            "items": [{ "productId": product_id, "quantity": 99 }],
        }))
        .send()
        .await
        .expect("Failed to send order");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn orders_are_scoped_to_their_owner() {
    let client = client();
    let admin = admin_token(&client).await;
    let buyer = register_user(&client).await;
    let stranger = register_user(&client).await;

    let product = create_product(&client, &admin, &unique("Vase"), "19.00", 5, &[]).await;
    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .bearer_auth(&buyer.token)
        .json(&json!({
            "items": [{ "productId": product["id"], "quantity": 1 }],
        }))
        .send()
        .await
        .expect("Failed to create order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");
    let order_id = order["id"].as_str().unwrap();

    // Another customer cannot see the order.
    let resp = client
        .get(format!("{}/api/orders/{order_id}", base_url()))
        .bearer_auth(&stranger.token)
        .send()
        .await
        .expect("Failed to fetch order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The admin listing is admin-only.
    let resp = client
        .get(format!("{}/api/orders/admin/all", base_url()))
        .bearer_auth(&buyer.token)
        .send()
        .await
        .expect("Failed to fetch admin listing");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .get(format!("{}/api/orders/admin/all", base_url()))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch admin listing");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Payment Intent
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn payment_intent_is_scoped_to_owned_orders() {
    let client = client();
    let user = register_user(&client).await;

    // The order id travels in the path; an order the caller does not own
    // (or that does not exist) is a 404 before any provider call.
    let resp = client
        .post(format!(
            "{}/api/payment/intent/00000000-0000-0000-0000-000000000000",
            base_url()
        ))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to request intent");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // And it is bearer-gated.
    let resp = client
        .post(format!(
            "{}/api/payment/intent/00000000-0000-0000-0000-000000000000",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to request intent");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Payment Webhook
// ============================================================================

fn now_unix() -> i64 {
    i64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs(),
    )
    .unwrap()
}

fn intent_event(event_type: &str, order_id: &str, user_id: &str) -> Vec<u8> {
    json!({
        "id": format!("evt_{order_id}"),
        "type": event_type,
        "data": {
            "object": {
                "id": format!("pi_{order_id}"),
                "status": "succeeded",
                "metadata": { "orderId": order_id, "userId": user_id },
            }
        }
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
#[ignore = "Requires running API server, database, and matching PAYMENT_WEBHOOK_SECRET"]
async fn webhook_marks_order_paid() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = register_user(&client).await;
    let secret = std::env::var("PAYMENT_WEBHOOK_SECRET").expect("PAYMENT_WEBHOOK_SECRET not set");

    let product = create_product(&client, &admin, &unique("Kettle"), "45.00", 5, &[]).await;
    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({
            "items": [{ "productId": product["id"], "quantity": 1 }],
        }))
        .send()
        .await
        .expect("Failed to create order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");
    let order_id = order["id"].as_str().unwrap();

    let body = intent_event("payment_intent.succeeded", order_id, &user.id);
    let header = sign_payload(&body, &secret, now_unix());

    let resp = client
        .post(format!("{}/api/payment/webhook", base_url()))
        .header("Webhook-Signature", header)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .expect("Failed to deliver webhook");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/api/orders/{order_id}", base_url()))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to fetch order");
    let fetched: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(fetched["status"].as_str(), Some("paid"));
}

#[tokio::test]
#[ignore = "Requires running API server, database, and matching PAYMENT_WEBHOOK_SECRET"]
async fn webhook_rejects_bad_signatures() {
    let client = client();
    let body = intent_event(
        "payment_intent.succeeded",
        "00000000-0000-0000-0000-000000000000",
        "00000000-0000-0000-0000-000000000000",
    );

    // No signature header at all.
    let resp = client
        .post(format!("{}/api/payment/webhook", base_url()))
        .header("Content-Type", "application/json")
        .body(body.clone())
        .send()
        .await
        .expect("Failed to deliver webhook");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Signed with the wrong secret.
    let header = sign_payload(&body, "whsec_not_the_real_secret", now_unix());
    let resp = client
        .post(format!("{}/api/payment/webhook", base_url()))
        .header("Webhook-Signature", header)
        .header("Content-Type", "application/json")
        .body(body.clone())
        .send()
        .await
        .expect("Failed to deliver webhook");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server, database, and matching PAYMENT_WEBHOOK_SECRET"]
async fn webhook_for_unknown_order_is_acknowledged() {
    let client = client();
    let secret = std::env::var("PAYMENT_WEBHOOK_SECRET").expect("PAYMENT_WEBHOOK_SECRET not set");

    let body = intent_event(
        "payment_intent.succeeded",
        "00000000-0000-0000-0000-000000000000",
        "00000000-0000-0000-0000-000000000000",
    );
    let header = sign_payload(&body, &secret, now_unix());

    // Unknown orders are acknowledged so the provider stops retrying.
    let resp = client
        .post(format!("{}/api/payment/webhook", base_url()))
        .header("Webhook-Signature", header)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .expect("Failed to deliver webhook");
    assert_eq!(resp.status(), StatusCode::OK);
    let ack: Value = resp.json().await.expect("Failed to parse ack");
    assert_eq!(ack["received"].as_bool(), Some(true));
}
