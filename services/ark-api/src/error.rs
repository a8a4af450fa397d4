//! API error types.
//!
//! Every failure a handler can produce maps to one `ApiError` variant,
//! which knows its HTTP status and renders a `{"detail": ...}` body.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kube::Error as KubeError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::duration::DurationError;

/// Structured failure reported by a Query in the `error` phase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Primary human-readable error
    pub message: String,
    /// Per-target errors, only populated when more than one target failed
    pub errors: Vec<TargetError>,
}

/// Error reported by a single query target.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TargetError {
    /// Target identifier, or `target-<index>` when the response had none
    pub target: String,
    /// Error text reported by the target
    pub message: String,
}

/// Errors returned by the ARK API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Query finished without any response
    #[error("No response received")]
    NoResponse,

    /// Query reached the `error` phase
    #[error("{}", .0.message)]
    QueryFailed(ErrorDetail),

    /// Query did not finish within its budget
    #[error("Query {query} timed out after {seconds} seconds")]
    Timeout {
        /// Query name
        query: String,
        /// Watch budget in seconds
        seconds: u64,
    },

    /// Request rejected before any resource was created
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Query watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::NoResponse
            | Self::QueryFailed(_)
            | Self::Kube(_)
            | Self::Watch(_)
            | Self::InvalidConfig(_)
            | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DurationError> for ApiError {
    fn from(e: DurationError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::QueryFailed(detail) => json!({ "detail": detail }),
            other => json!({ "detail": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NoResponse.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::Timeout { query: "q".to_string(), seconds: 5 }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::InvalidRequest("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_timeout_message_names_query_and_budget() {
        let err = ApiError::Timeout { query: "openai-query-1".to_string(), seconds: 30 };
        assert_eq!(err.to_string(), "Query openai-query-1 timed out after 30 seconds");
    }

    #[test]
    fn test_duration_error_is_bad_request() {
        let err: ApiError = DurationError::InvalidFormat("1d".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid request: Invalid duration format: 1d");
    }
}
