//! Integration tests for order visibility and admin lifecycle updates.

use axum::http::StatusCode;
use serde_json::{Value, json};
use shophub_integration_tests::{TestApp, admin, dec, money, shopper};

/// Place a one-shirt order as the current visitor and return its number.
async fn place_order(app: &mut TestApp) -> String {
    app.add_to_cart("1", 1).await;
    let response = app.checkout().await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["order_number"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_default()
}

fn step_flags(order: &Value) -> Vec<bool> {
    order["tracking_steps"]
        .as_array()
        .map(|steps| steps.iter().map(|s| s["completed"] == true).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_guest_order_visible_by_number() {
    let mut guest = TestApp::new();
    let number = place_order(&mut guest).await;

    let mut stranger = guest.new_visitor();
    let response = stranger.get(&format!("/api/orders/{number}")).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_order_hidden_from_others() {
    let mut owner = TestApp::new();
    owner.login(&shopper(1)).await;
    let number = place_order(&mut owner).await;
    let uri = format!("/api/orders/{number}");

    assert_eq!(owner.get(&uri).await.status, StatusCode::OK);

    let mut guest = owner.new_visitor();
    assert_eq!(guest.get(&uri).await.status, StatusCode::NOT_FOUND);

    let mut other = owner.new_visitor();
    other.login(&shopper(2)).await;
    assert_eq!(other.get(&uri).await.status, StatusCode::NOT_FOUND);

    let mut staff = owner.new_visitor();
    staff.login(&admin(99)).await;
    assert_eq!(staff.get(&uri).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_order() {
    let mut app = TestApp::new();
    let response = app.get("/api/orders/ORD-1760432400000-ZZZZZZZZZ").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/api/orders/garbage").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_list() {
    let mut first = TestApp::new();
    first.login(&shopper(1)).await;
    place_order(&mut first).await;
    place_order(&mut first).await;

    let mut second = first.new_visitor();
    second.login(&shopper(2)).await;
    place_order(&mut second).await;

    let mut anonymous = first.new_visitor();
    assert_eq!(anonymous.get("/api/orders").await.status, StatusCode::UNAUTHORIZED);

    let mine = first.get("/api/orders").await.body;
    assert_eq!(mine.as_array().map(Vec::len), Some(2));

    let mut staff = first.new_visitor();
    staff.login(&admin(99)).await;
    let all = staff.get("/api/orders").await.body;
    assert_eq!(all.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_status_update_requires_admin() {
    let mut guest = TestApp::new();
    let number = place_order(&mut guest).await;
    let uri = format!("/api/orders/{number}/status");
    let body = json!({ "status": "processing", "step_index": 1 });

    assert_eq!(
        guest.patch(&uri, body.clone()).await.status,
        StatusCode::UNAUTHORIZED
    );

    let mut user = guest.new_visitor();
    user.login(&shopper(5)).await;
    assert_eq!(user.patch(&uri, body.clone()).await.status, StatusCode::FORBIDDEN);

    let mut staff = guest.new_visitor();
    staff.login(&admin(99)).await;
    let response = staff.patch(&uri, body).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["status"], "processing");
}

#[tokio::test]
async fn test_lifecycle_through_delivery() {
    let mut app = TestApp::new();
    let number = place_order(&mut app).await;
    let uri = format!("/api/orders/{number}/status");
    app.login(&admin(99)).await;

    for (status, step) in [
        ("processing", 1),
        ("shipped", 2),
        ("shipped", 3),
        ("delivered", 4),
    ] {
        let response = app
            .patch(&uri, json!({ "status": status, "step_index": step }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{status}/{step}: {:?}", response.body);
    }

    let order = app.get(&format!("/api/orders/{number}")).await.body;
    assert_eq!(order["status"], "delivered");
    assert_eq!(step_flags(&order), vec![true; 5]);
    assert!(order["current_step"].is_null());

    // Delivered is terminal.
    let response = app.patch(&uri, json!({ "status": "cancelled" })).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejected_updates_change_nothing() {
    let mut app = TestApp::new();
    let number = place_order(&mut app).await;
    let uri = format!("/api/orders/{number}/status");
    app.login(&admin(99)).await;

    // Skipping ahead.
    let response = app
        .patch(&uri, json!({ "status": "shipped", "step_index": 3 }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    app.patch(&uri, json!({ "status": "processing", "step_index": 1 }))
        .await;

    // Moving backwards.
    let response = app.patch(&uri, json!({ "status": "pending" })).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let order = app.get(&format!("/api/orders/{number}")).await.body;
    assert_eq!(order["status"], "processing");
    assert_eq!(step_flags(&order), vec![true, true, false, false, false]);
}

#[tokio::test]
async fn test_cancel_and_out_of_range_step() {
    let mut app = TestApp::new();
    let number = place_order(&mut app).await;
    let uri = format!("/api/orders/{number}/status");
    app.login(&admin(99)).await;

    // An index past the last step is ignored.
    let response = app
        .patch(&uri, json!({ "status": "processing", "step_index": 12 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(step_flags(&response.body), vec![true, false, false, false, false]);

    // Cancelling cannot also advance a step.
    let response = app
        .patch(&uri, json!({ "status": "cancelled", "step_index": 1 }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app.patch(&uri, json!({ "status": "cancelled" })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "cancelled");

    let response = app
        .patch(&uri, json!({ "status": "processing", "step_index": 1 }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_stats() {
    let mut shop = TestApp::new();
    place_order(&mut shop).await;
    let cancelled = place_order(&mut shop).await;

    let mut staff = shop.new_visitor();
    staff.login(&admin(99)).await;
    staff
        .patch(
            &format!("/api/orders/{cancelled}/status"),
            json!({ "status": "cancelled" }),
        )
        .await;

    let response = staff.get("/api/admin/stats").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total_orders"], 2);
    assert_eq!(response.body["pending_orders"], 1);
    assert_eq!(money(&response.body["total_revenue"]), dec("38.39"));

    let mut user = shop.new_visitor();
    user.login(&shopper(3)).await;
    assert_eq!(user.get("/api/admin/stats").await.status, StatusCode::FORBIDDEN);
}
