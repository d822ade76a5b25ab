//! Integration tests for the category tree and product catalog.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p kiosk-api)
//! - `SEED_ADMIN_PASSWORD` set for both server and tests
//!
//! Run with: cargo test -p kiosk-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use kiosk_integration_tests::{
    admin_token, base_url, client, create_child_category, create_category, create_product,
    register_user, unique,
};

// ============================================================================
// Category Tree
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn category_tree_and_descendants() {
    let client = client();
    let admin = admin_token(&client).await;

    let root = create_category(&client, &admin, &unique("Outdoors")).await;
    let child = create_child_category(&client, &admin, &unique("Tents"), Some(&root)).await;
    let grandchild =
        create_child_category(&client, &admin, &unique("Family Tents"), Some(&child)).await;

    // Strict descendants: child and grandchild, never the node itself.
    let resp = client
        .get(format!("{}/api/categories/{root}/descendants", base_url()))
        .send()
        .await
        .expect("Failed to fetch descendants");
    assert_eq!(resp.status(), StatusCode::OK);
    let descendants: Vec<Value> = resp.json().await.expect("Failed to parse descendants");
    let ids: Vec<&str> = descendants
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&child.as_str()));
    assert!(ids.contains(&grandchild.as_str()));
    assert!(!ids.contains(&root.as_str()));

    // The tree nests children under their parents.
    let resp = client
        .get(format!("{}/api/categories/tree", base_url()))
        .send()
        .await
        .expect("Failed to fetch tree");
    assert_eq!(resp.status(), StatusCode::OK);
    let tree: Vec<Value> = resp.json().await.expect("Failed to parse tree");
    let root_node = tree
        .iter()
        .find(|n| n["id"].as_str() == Some(root.as_str()))
        .expect("root missing from tree");
    let child_node = root_node["children"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"].as_str() == Some(child.as_str()))
        .expect("child missing from tree");
    assert!(
        child_node["children"]
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["id"].as_str() == Some(grandchild.as_str()))
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn reparent_rejects_own_descendant() {
    let client = client();
    let admin = admin_token(&client).await;

    let root = create_category(&client, &admin, &unique("Cycles")).await;
    let child = create_child_category(&client, &admin, &unique("Road Bikes"), Some(&root)).await;

    // A node cannot be moved under itself or its own subtree.
    let resp = client
        .patch(format!("{}/api/categories/{root}", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "parentId": child }))
        .send()
        .await
        .expect("Failed to send reparent");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Explicit null moves a child to the root.
    let resp = client
        .patch(format!("{}/api/categories/{child}", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "parentId": null }))
        .send()
        .await
        .expect("Failed to send reparent");
    assert_eq!(resp.status(), StatusCode::OK);
    let moved: Value = resp.json().await.expect("Failed to parse category");
    assert!(moved["parentId"].is_null());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn category_writes_are_admin_only() {
    let client = client();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/api/categories", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({ "name": unique("Sneaky") }))
        .send()
        .await
        .expect("Failed to send create");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Product Listing & Filters
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn product_listing_is_direct_while_subtree_route_expands() {
    let client = client();
    let admin = admin_token(&client).await;

    let root = create_category(&client, &admin, &unique("Kitchen")).await;
    let child = create_child_category(&client, &admin, &unique("Cookware"), Some(&root)).await;

    let direct = create_product(&client, &admin, &unique("Stock Pot"), "49.99", 10, &[&root]).await;
    let nested = create_product(&client, &admin, &unique("Skillet"), "29.99", 10, &[&child]).await;

    // ?categoryId= only matches products attached to that exact category.
    let resp = client
        .get(format!("{}/api/products?categoryId={root}", base_url()))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse listing");
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&direct["id"].as_str().unwrap()));
    assert!(!ids.contains(&nested["id"].as_str().unwrap()));

    // The subtree route picks up products from descendant categories too.
    let resp = client
        .get(format!("{}/api/products/category/{root}", base_url()))
        .send()
        .await
        .expect("Failed to list subtree products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse listing");
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&direct["id"].as_str().unwrap()));
    assert!(ids.contains(&nested["id"].as_str().unwrap()));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn product_filters_and_pagination() {
    let client = client();
    let admin = admin_token(&client).await;

    let category = create_category(&client, &admin, &unique("Filters")).await;
    let needle = unique("Tungsten Lamp");
    create_product(&client, &admin, &needle, "15.00", 5, &[&category]).await;
    create_product(&client, &admin, &unique("Plain Lamp"), "250.00", 5, &[&category]).await;

    // Search is a case-insensitive substring match.
    let resp = client
        .get(format!("{}/api/products?search=tungsten", base_url()))
        .send()
        .await
        .expect("Failed to search products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse listing");
    assert!(
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["name"].as_str() == Some(needle.as_str()))
    );

    // Price bounds and sort direction.
    let resp = client
        .get(format!(
            "{}/api/products?categoryId={category}&maxPrice=100&sortBy=price&sortDir=asc",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to filter products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse listing");
    let products = body["items"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"].as_str(), Some(needle.as_str()));

    // Unknown sort columns are rejected, not interpolated.
    let resp = client
        .get(format!(
            "{}/api/products?sortBy=price;DROP TABLE products",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to send listing");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Pagination metadata reflects the page and limit.
    let resp = client
        .get(format!(
            "{}/api/products?categoryId={category}&page=1&limit=1",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to paginate products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse listing");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["limit"].as_i64(), Some(1));
    assert!(body["total"].as_i64().unwrap() >= 2);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn product_lookup_by_slug() {
    let client = client();
    let admin = admin_token(&client).await;

    let name = unique("Walnut Desk");
    let product = create_product(&client, &admin, &name, "399.00", 3, &[]).await;
    let slug = product["slug"].as_str().unwrap();

    let resp = client
        .get(format!("{}/api/products/slug/{slug}", base_url()))
        .send()
        .await
        .expect("Failed to fetch by slug");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(body["id"], product["id"]);

    let resp = client
        .get(format!("{}/api/products/slug/no-such-product", base_url()))
        .send()
        .await
        .expect("Failed to fetch by slug");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
