//! Integration tests for ShopHub.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shophub-integration-tests
//! ```
//!
//! The tests drive the full storefront router in process with
//! `tower::ServiceExt::oneshot`. Sessions live in a `MemoryStore` and orders
//! and products in the in-memory repositories, so no database is needed.
//!
//! # Test Categories
//!
//! - `cart` - Cart and coupon endpoints
//! - `wishlist` - Wishlist and move-to-cart
//! - `checkout` - Placing orders
//! - `orders` - Order visibility and admin lifecycle updates

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session};

use shophub_core::{Email, Money, ProductId, UserId, UserRole};
use shophub_storefront::config::StorefrontConfig;
use shophub_storefront::db::{InMemoryCatalog, InMemoryOrderRepository};
use shophub_storefront::middleware::{SESSION_COOKIE_NAME, session_layer, set_current_user};
use shophub_storefront::models::{CatalogProduct, CurrentUser};
use shophub_storefront::routes;
use shophub_storefront::services::checkout::RandomOrderNumbers;
use shophub_storefront::state::AppState;

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON, or the raw text as a JSON string if the body is not JSON.
    pub body: Value,
}

/// One visitor talking to an in-process storefront.
///
/// Keeps the session cookie between requests like a browser would.
pub struct TestApp {
    router: Router,
    sessions: MemoryStore,
    pub orders: Arc<InMemoryOrderRepository>,
    pub catalog: Arc<InMemoryCatalog>,
    cookie: Option<String>,
}

impl TestApp {
    /// A storefront with the default pricing and [`sample_catalog`].
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// A storefront configured with extra environment variables.
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_DATABASE_URL" => Some("postgres://unused/shophub".to_string()),
            "STOREFRONT_BASE_URL" => Some("http://localhost:5000".to_string()),
            _ => vars
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string()),
        })
        .expect("test configuration is valid");

        let orders = Arc::new(InMemoryOrderRepository::new());
        let catalog = Arc::new(InMemoryCatalog::with_products(sample_catalog()));
        let state = AppState::from_parts(
            config,
            orders.clone(),
            catalog.clone(),
            Arc::new(RandomOrderNumbers),
        );

        let sessions = MemoryStore::default();
        let router = routes::app(state, session_layer(sessions.clone(), false));

        Self {
            router,
            sessions,
            orders,
            catalog,
            cookie: None,
        }
    }

    /// Another visitor on the same storefront, with no session yet.
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            sessions: self.sessions.clone(),
            orders: self.orders.clone(),
            catalog: self.catalog.clone(),
            cookie: None,
        }
    }

    /// Log in as `user`, as the credential service would.
    ///
    /// Starts a fresh session, so anything in a previous guest session is
    /// left behind.
    pub async fn login(&mut self, user: &CurrentUser) {
        let session = Session::new(None, Arc::new(self.sessions.clone()), None);
        set_current_user(&session, user)
            .await
            .expect("session insert");
        session.save().await.expect("session save");
        let id = session.id().expect("saved session has an id");
        self.cookie = Some(format!("{SESSION_COOKIE_NAME}={id}"));
    }

    /// Send a request, keeping any session cookie the server sets.
    pub async fn request(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default().trim();
            if pair.starts_with(SESSION_COOKIE_NAME) {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, body }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Add `quantity` of `product_id` to the cart, asserting success.
    pub async fn add_to_cart(&mut self, product_id: &str, quantity: i64) -> Value {
        let response = self
            .post(
                "/api/cart/add",
                json!({ "product_id": product_id, "quantity": quantity }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body
    }

    /// Place an order with [`checkout_form`].
    pub async fn checkout(&mut self) -> TestResponse {
        self.post("/api/checkout", checkout_form()).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Products available in every test storefront.
///
/// - `"1"` Linen Shirt, $30.00
/// - `"2"` Canvas Tote, $12.50, on sale from $25.00
/// - `"3"` Wool Coat, $120.00, out of stock
/// - `"4"` Desk Lamp, $100.00
pub fn sample_catalog() -> Vec<CatalogProduct> {
    let product = |id: &str, name: &str, cents: u32| CatalogProduct {
        id: ProductId::new(id).expect("non-empty id"),
        name: name.to_string(),
        price: Money::from_cents(cents),
        original_price: None,
        image: Some(format!("/images/{id}.jpg")),
        stock: Some(5),
    };

    vec![
        product("1", "Linen Shirt", 3000),
        CatalogProduct {
            original_price: Some(Money::from_cents(2500)),
            ..product("2", "Canvas Tote", 1250)
        },
        CatalogProduct {
            stock: Some(0),
            ..product("3", "Wool Coat", 12000)
        },
        product("4", "Desk Lamp", 10000),
    ]
}

/// A checkout form that passes validation.
pub fn checkout_form() -> Value {
    json!({
        "email": "ada@example.com",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "phone": "555-0100",
        "address": "1 Analytical Way",
        "city": "London",
        "state": "",
        "zip_code": "12345",
        "card_number": "4242 4242 4242 4242",
        "card_name": "A Lovelace",
        "expiry_date": "12/30",
        "cvv": "123"
    })
}

pub fn shopper(id: i32) -> CurrentUser {
    CurrentUser {
        id: UserId::new(id),
        email: Email::parse(&format!("shopper{id}@example.com")).expect("valid email"),
        role: UserRole::User,
    }
}

pub fn admin(id: i32) -> CurrentUser {
    CurrentUser {
        id: UserId::new(id),
        email: Email::parse(&format!("admin{id}@example.com")).expect("valid email"),
        role: UserRole::Admin,
    }
}

/// Read a JSON money field.
pub fn money(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a money value: {value}"))
}

/// Parse a decimal literal.
pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap_or_else(|_| panic!("not a decimal: {s}"))
}
