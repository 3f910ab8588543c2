//! Cart resource route handlers.
//!
//! Handlers classify the request (resource, action type, operation), bind it
//! to the session's cart key and run the blocking resource dispatch on the
//! blocking thread pool.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use cart_api_core::Attributes;
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::CartCache;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::session_key;
use crate::resource::{ActionType, Operation, ResourceKind, ResourceRequest, ResourceResponse};
use crate::state::AppState;

/// Map an HTTP method to a resource operation.
///
/// # Errors
///
/// Returns `AppError::MethodNotAllowed` for methods with no operation.
pub fn operation_for(method: &Method) -> Result<Operation> {
    match *method {
        Method::GET => Ok(Operation::Retrieve),
        Method::POST => Ok(Operation::Create),
        Method::PUT | Method::PATCH => Ok(Operation::Update),
        Method::DELETE => Ok(Operation::Delete),
        _ => Err(AppError::MethodNotAllowed(method.to_string())),
    }
}

/// Parse a request body into attributes. An empty body or `null` is an
/// empty object.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the body is not a JSON object.
pub fn parse_body(body: &[u8]) -> Result<Attributes> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Attributes::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(data)) => Ok(data),
        Ok(Value::Null) => Ok(Attributes::new()),
        Ok(_) => Err(AppError::BadRequest(
            "request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(AppError::BadRequest(format!("invalid JSON body: {e}"))),
    }
}

async fn handle(
    state: AppState,
    session: Session,
    kind: ResourceKind,
    action: ActionType,
    id: Option<String>,
    method: &Method,
    body: &[u8],
) -> Result<Response> {
    let operation = operation_for(method)?;
    let body = parse_body(body)?;
    let key = session_key(&session).await?;

    add_breadcrumb(
        "cart",
        "resource request",
        &[("resource", kind.as_str()), ("method", method.as_str())],
    );

    let mut request = ResourceRequest::new(action, operation).with_body(body);
    if let Some(id) = id {
        request = request.with_id(id);
    }

    let response = tokio::task::spawn_blocking(move || {
        let mut cache = CartCache::new();
        state.api().dispatch(kind, &mut cache, &key, request)
    })
    .await
    .map_err(|e| AppError::Internal(format!("dispatch task failed: {e}")))??;

    Ok(match response {
        ResourceResponse::Render(value) => Json(value).into_response(),
        ResourceResponse::NoContent => StatusCode::NO_CONTENT.into_response(),
    })
}

/// `/api/cart`
#[instrument(skip(state, session, body))]
pub async fn cart(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    handle(state, session, ResourceKind::Cart, ActionType::Entity, None, &method, &body).await
}

/// `/api/cart/billing_address`
#[instrument(skip(state, session, body))]
pub async fn billing_address(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    handle(
        state,
        session,
        ResourceKind::BillingAddress,
        ActionType::Entity,
        None,
        &method,
        &body,
    )
    .await
}

/// `/api/cart/shipping_address`
#[instrument(skip(state, session, body))]
pub async fn shipping_address(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    handle(
        state,
        session,
        ResourceKind::ShippingAddress,
        ActionType::Entity,
        None,
        &method,
        &body,
    )
    .await
}

/// `/api/cart/payment`
#[instrument(skip(state, session, body))]
pub async fn payment(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    handle(state, session, ResourceKind::Payment, ActionType::Entity, None, &method, &body).await
}

/// `/api/cart/items`
#[instrument(skip(state, session, body))]
pub async fn items(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    handle(state, session, ResourceKind::Item, ActionType::Collection, None, &method, &body).await
}

/// `/api/cart/items/{id}`
#[instrument(skip(state, session, body))]
pub async fn item(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    handle(
        state,
        session,
        ResourceKind::Item,
        ActionType::Entity,
        Some(id),
        &method,
        &body,
    )
    .await
}

/// `/api/cart/validation`
#[instrument(skip(state, session, body))]
pub async fn validation(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    handle(state, session, ResourceKind::Validation, ActionType::Entity, None, &method, &body).await
}
