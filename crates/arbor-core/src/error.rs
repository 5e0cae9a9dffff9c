//! Error types for Arbor

use crate::method::Method;
use http::StatusCode;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for Arbor operations
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Standard API error type
///
/// Carries the status code and a structured JSON body written to the wire.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error type identifier
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(
        status: StatusCode,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Create a 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON representation of an API error response
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: ErrorBody {
                error_type: err.error_type.clone(),
                message: err.message.clone(),
            },
        }
    }
}

/// Fatal route-configuration errors raised during registration.
///
/// These abort startup: the chainable builder methods panic with the
/// `Display` of the error, and `try_route` surfaces the `Result` form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    /// A route was registered without any handlers.
    #[error("no handlers registered for {method} {pattern}")]
    EmptyHandlerChain {
        /// Routing method of the offending registration
        method: Method,
        /// Pattern as passed to the registration call
        pattern: String,
    },

    /// Two routes with identical segment structure (parameter names
    /// notwithstanding) were registered for the same method.
    #[error("duplicate route: {method} {pattern} is already registered")]
    DuplicateRoute {
        /// Routing method of the offending registration
        method: Method,
        /// Pattern as passed to the registration call
        pattern: String,
    },

    /// A `*` segment appeared anywhere but the final position.
    #[error("wildcard must be the final segment of a pattern: {method} {pattern}")]
    WildcardNotLast {
        /// Routing method of the offending registration
        method: Method,
        /// Pattern as passed to the registration call
        pattern: String,
    },
}
