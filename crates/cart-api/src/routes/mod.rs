//! HTTP route handlers for the cart API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Health check
//!
//! # Cart (session-bound)
//! GET|PUT|PATCH|DELETE /api/cart                   - Cart summary, email, empty cart
//! GET|POST|PUT|PATCH|DELETE /api/cart/billing_address
//! GET|POST|PUT|PATCH|DELETE /api/cart/shipping_address
//! GET|POST|PUT|PATCH|DELETE /api/cart/payment
//! GET|POST /api/cart/items                         - Item list, add item
//! GET|PUT|PATCH|DELETE /api/cart/items/{id}        - Single item
//! GET  /api/cart/validation                        - Checkout validation report
//! ```
//!
//! Every path accepts any method; methods a resource does not support are
//! rejected by the resource layer with `RESOURCE_METHOD_NOT_ALLOWED`.

pub mod resources;

use axum::{Router, routing::any};

use crate::state::AppState;

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart", any(resources::cart))
        .route("/api/cart/billing_address", any(resources::billing_address))
        .route("/api/cart/shipping_address", any(resources::shipping_address))
        .route("/api/cart/payment", any(resources::payment))
        .route("/api/cart/items", any(resources::items))
        .route("/api/cart/items/{id}", any(resources::item))
        .route("/api/cart/validation", any(resources::validation))
}
