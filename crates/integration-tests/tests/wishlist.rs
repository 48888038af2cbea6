//! Integration tests for the wishlist.

use axum::http::StatusCode;
use serde_json::json;
use shophub_integration_tests::TestApp;

#[tokio::test]
async fn test_add_and_remove() {
    let mut app = TestApp::new();
    let response = app.post("/api/wishlist/add", json!({ "product_id": "2" })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["items"][0]["savings_percent"], 50);
    assert_eq!(response.body["items"][0]["in_stock"], true);

    // Saving twice is a no-op.
    let response = app.post("/api/wishlist/add", json!({ "product_id": "2" })).await;
    assert_eq!(response.body["count"], 1);

    let response = app
        .post("/api/wishlist/remove", json!({ "product_id": "2" }))
        .await;
    assert_eq!(response.body["count"], 0);
    assert_eq!(app.get("/api/wishlist").await.body["count"], 0);
}

#[tokio::test]
async fn test_move_to_cart() {
    let mut app = TestApp::new();
    app.post("/api/wishlist/add", json!({ "product_id": "1" })).await;
    app.add_to_cart("1", 2).await;

    let response = app
        .post("/api/wishlist/move-to-cart", json!({ "product_id": "1" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 0);
    assert_eq!(response.body["cart_count"], 3);
}

#[tokio::test]
async fn test_move_out_of_stock_is_rejected_atomically() {
    let mut app = TestApp::new();
    app.post("/api/wishlist/add", json!({ "product_id": "3" })).await;

    let response = app
        .post("/api/wishlist/move-to-cart", json!({ "product_id": "3" }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    assert_eq!(app.get("/api/wishlist").await.body["count"], 1);
    assert_eq!(app.get("/api/cart/count").await.body["count"], 0);
}

#[tokio::test]
async fn test_move_missing_line() {
    let mut app = TestApp::new();
    let response = app
        .post("/api/wishlist/move-to-cart", json!({ "product_id": "1" }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_move_all_leaves_out_of_stock() {
    let mut app = TestApp::new();
    for id in ["1", "2", "3"] {
        app.post("/api/wishlist/add", json!({ "product_id": id })).await;
    }

    let response = app.post("/api/wishlist/move-all-to-cart", json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["moved"], 2);
    assert_eq!(response.body["wishlist"]["count"], 1);
    assert_eq!(response.body["wishlist"]["items"][0]["product_id"], "3");
    assert_eq!(response.body["cart"]["count"], 2);
}
