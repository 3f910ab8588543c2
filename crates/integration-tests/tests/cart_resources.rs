//! Integration tests for the cart sub-resources over HTTP.

use axum::http::{Method, StatusCode};
use cart_api_integration_tests::TestClient;
use serde_json::{Value, json};

// =============================================================================
// Routing and errors
// =============================================================================

#[tokio::test]
async fn test_health() {
    let mut client = TestClient::new();
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_validation_is_retrieve_only() {
    let mut client = TestClient::new();

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let response = client.send(method, "/api/cart/validation", None).await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.body["error"]["code"], "RESOURCE_METHOD_NOT_ALLOWED");
    }
}

#[tokio::test]
async fn test_cart_has_no_create() {
    let mut client = TestClient::new();
    let response = client.post("/api/cart", json!({"email": "a@example.com"})).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unsupported_http_method() {
    let mut client = TestClient::new();
    let response = client.send(Method::OPTIONS, "/api/cart", None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.body["error"]["code"], "RESOURCE_METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let mut client = TestClient::new();
    let response = client.put("/api/cart", json!(["email"])).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "RESOURCE_DATA_INVALID");
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_empty_cart_renders_every_readable_attribute() {
    let mut client = TestClient::new();
    let response = client.get("/api/cart").await;

    assert_eq!(response.status, StatusCode::OK);
    let cart = response.body.as_object().expect("cart is an object");
    for code in [
        "cart_id",
        "email",
        "currency",
        "is_virtual",
        "items_count",
        "items_qty",
        "subtotal",
        "shipping_amount",
        "grand_total",
        "updated_at",
        "validation",
    ] {
        assert!(cart.contains_key(code), "missing {code}");
    }
    assert_eq!(cart["currency"], "USD");
    assert_eq!(cart["email"], Value::Null);
    assert!(!cart.contains_key("customer_email"));
}

#[tokio::test]
async fn test_cart_email_reaches_billing_address() {
    let mut client = TestClient::new();

    let response = client
        .put("/api/cart", json!({"email": "shopper@example.com", "currency": "EUR"}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], "shopper@example.com");
    // Not writable, silently dropped.
    assert_eq!(response.body["currency"], "USD");

    let billing = client.get("/api/cart/billing_address").await;
    assert_eq!(billing.body["email"], "shopper@example.com");
}

#[tokio::test]
async fn test_cart_invalid_email() {
    let mut client = TestClient::new();
    let response = client.put("/api/cart", json!({"email": "not-an-email"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_session_isolation() {
    let mut first = TestClient::new();
    let response = first
        .put("/api/cart", json!({"email": "first@example.com"}))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let mut second = TestClient::new();
    let response = second.get("/api/cart").await;
    assert_eq!(response.body["email"], Value::Null);
}

// =============================================================================
// Addresses
// =============================================================================

#[tokio::test]
async fn test_billing_region_code_resolves() {
    let mut client = TestClient::new();
    let response = client
        .put(
            "/api/cart/billing_address",
            json!({"first_name": "Ada", "country_id": "US", "region": "CA"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["first_name"], "Ada");
    assert_eq!(response.body["region"], "California");
    assert_eq!(response.body["region_id"], 12);
    assert!(response.body.get("firstname").is_none());
}

#[tokio::test]
async fn test_address_delete_resets() {
    let mut client = TestClient::new();
    client
        .put("/api/cart/shipping_address", json!({"city": "Austin"}))
        .await;

    let response = client.delete("/api/cart/shipping_address").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.body, Value::Null);

    let response = client.get("/api/cart/shipping_address").await;
    assert_eq!(response.body["city"], Value::Null);
}

// =============================================================================
// Payment
// =============================================================================

#[tokio::test]
async fn test_payment_data_wrapper_is_flattened() {
    let mut client = TestClient::new();
    let response = client
        .put(
            "/api/cart/payment",
            json!({"data": {"method": "checkmo", "po_number": "PO-77"}}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["method"], "checkmo");
    assert_eq!(response.body["po_number"], "PO-77");
    assert!(response.body.get("data").is_none());
    assert!(response.body.get("cc_last_4").is_none());
}

#[tokio::test]
async fn test_payment_unknown_method_is_rejected() {
    let mut client = TestClient::new();
    let response = client
        .put("/api/cart/payment", json!({"method": "no_such_method"}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "RESOURCE_DATA_INVALID");

    let response = client.get("/api/cart/payment").await;
    assert_eq!(response.body["method"], Value::Null);
}

#[tokio::test]
async fn test_payment_delete_returns_no_content() {
    let mut client = TestClient::new();
    client
        .put("/api/cart/payment", json!({"method": "checkmo"}))
        .await;

    let response = client.delete("/api/cart/payment").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.body, Value::Null);

    let response = client.get("/api/cart/payment").await;
    assert_eq!(response.body["method"], Value::Null);
}

// =============================================================================
// Items
// =============================================================================

#[tokio::test]
async fn test_item_lifecycle() {
    let mut client = TestClient::new();

    let response = client
        .post("/api/cart/items", json!({"sku": "tee-classic", "qty": 2}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["item_id"], 1);
    assert_eq!(response.body["sku"], "tee-classic");
    assert_eq!(response.body["qty"], 2);

    let response = client.put("/api/cart/items/1", json!({"qty": "3"})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["qty"], 3);

    let response = client.get("/api/cart/items").await;
    assert_eq!(response.body.as_array().map(Vec::len), Some(1));

    let cart = client.get("/api/cart").await;
    assert_eq!(cart.body["items_qty"], 3);

    let response = client.put("/api/cart/items/1", json!({"qty": 0})).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = client.get("/api/cart/items/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_item_sku_is_create_only() {
    let mut client = TestClient::new();
    client
        .post("/api/cart/items", json!({"sku": "mug-enamel"}))
        .await;

    let response = client
        .put("/api/cart/items/1", json!({"sku": "tee-classic", "qty": 4}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sku"], "mug-enamel");
    assert_eq!(response.body["qty"], 4);
}

#[tokio::test]
async fn test_item_errors() {
    let mut client = TestClient::new();

    let response = client
        .post("/api/cart/items", json!({"sku": "no-such-thing"}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = client
        .post("/api/cart/items", json!({"sku": "tee-classic", "qty": 0}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = client.delete("/api/cart/items/42").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
