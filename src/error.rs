//! Unified error types for the diagnostic server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Process-level error type.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Prometheus recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error (bind, accept, serve).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operating-system introspection errors.
#[derive(Error, Debug)]
pub enum HostError {
    /// The hostname could not be read.
    #[error("failed to read hostname: {0}")]
    Hostname(#[source] std::io::Error),

    /// Network interfaces could not be listed.
    #[error("failed to list network interfaces: {0}")]
    Interfaces(#[source] std::io::Error),
}

/// Per-request errors, rendered as JSON error bodies.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The `code` path parameter is not a usable status code.
    #[error("{0}")]
    InvalidStatusCode(String),

    /// The request body could not be read as JSON.
    #[error("invalid request payload: {0}")]
    InvalidPayload(String),

    /// No route matched.
    #[error("Not Found")]
    NotFound,

    /// Something failed on our side.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error body: `{statusCode, error, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// HTTP status code of the response.
    pub status_code: u16,
    /// Standard reason phrase for the status.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

impl ErrorBody {
    /// Build an error body for `status` with the given message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: message.into(),
        }
    }
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidStatusCode(_) | ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client. Internal causes are not exposed.
    pub fn body(&self) -> ErrorBody {
        let message = match self {
            ApiError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };
        ErrorBody::new(self.status(), message)
    }
}

impl From<HostError> for ApiError {
    fn from(err: HostError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("blocking task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!(%cause, "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServerError>;
