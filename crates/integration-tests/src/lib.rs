//! Integration tests for the cart API.
//!
//! Tests drive the full router in-process (session layer, request id,
//! tracing) with the in-memory collaborators, so no server or database is
//! needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cart-api-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use cart_api::config::ApiConfig;
use cart_api::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

/// A decoded response. An empty body decodes to `Value::Null` and a
/// non-JSON body to `Value::String`.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// In-process client that keeps one session cookie, like a browser.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClient {
    /// Build the app with default configuration and in-memory collaborators.
    #[must_use]
    pub fn new() -> Self {
        let config = ApiConfig::from_lookup(|_| None).expect("default config is valid");
        let state = AppState::in_memory(config).expect("attribute maps are bijections");
        Self {
            app: cart_api::app(state),
            cookie: None,
        }
    }

    /// Send a request, carrying and refreshing the session cookie.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request is well formed");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }
}
