//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. Every error renders as
//! `{"error": {"code": ..., "message": ...}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::resource::ResourceError;

/// Application-level error type for the cart API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource dispatch failed.
    #[error("{0}")]
    Resource(#[from] ResourceError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP method with no resource operation.
    #[error("Method {0} is not allowed")]
    MethodNotAllowed(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Resource(err) => err.code(),
            Self::BadRequest(_) => "RESOURCE_DATA_INVALID",
            Self::MethodNotAllowed(_) => "RESOURCE_METHOD_NOT_ALLOWED",
            Self::Session(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Resource(err) => match err {
                ResourceError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
                ResourceError::InvalidData(_) => StatusCode::BAD_REQUEST,
                ResourceError::NotFound(_) => StatusCode::NOT_FOUND,
                ResourceError::Cart(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for cart actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use cart_api_core::CartServiceError;

    use super::*;
    use crate::resource::{ActionType, Operation, PipelineContext, ResourceKind};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("body is not a JSON object".to_string());
        assert_eq!(err.to_string(), "Bad request: body is not a JSON object");
    }

    #[test]
    fn test_app_error_status_codes() {
        let context = PipelineContext::new(
            ResourceKind::Payment,
            ActionType::Collection,
            Operation::Create,
        );

        assert_eq!(
            get_status(ResourceError::method_not_allowed(context).into()),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            get_status(ResourceError::NotFound("item 9".to_string()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ResourceError::InvalidData("qty".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ResourceError::Cart(CartServiceError::Save("disk".to_string())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::MethodNotAllowed("OPTIONS".to_string())),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::MethodNotAllowed("HEAD".to_string()).code(),
            "RESOURCE_METHOD_NOT_ALLOWED"
        );
        assert_eq!(AppError::Internal("x".to_string()).code(), "INTERNAL_ERROR");
    }
}
