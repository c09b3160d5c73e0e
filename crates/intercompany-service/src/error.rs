//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use intercompany_core::LedgerError;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - the key already holds a record.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A transfer asked for more than the license holds.
    #[error("insufficient quantity on license {key}: held={held}, requested={requested}")]
    InsufficientQuantity {
        /// Source license key.
        key: String,
        /// Units held.
        held: String,
        /// Units requested.
        requested: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// HTTP status and machine-readable code.
    const fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Self::InsufficientQuantity { .. } => (StatusCode::CONFLICT, "insufficient_quantity"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Message shown to the caller. Storage failures are not echoed.
    fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Unauthorized | Self::InsufficientQuantity { .. } => self.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::InsufficientQuantity {
                key,
                held,
                requested,
            } => Some(serde_json::json!({
                "licenseKey": key,
                "held": held,
                "requested": requested
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(msg) = &self {
            tracing::error!(error = %msg, "Ledger invocation failed in storage");
        }

        let (status, code) = self.classify();
        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.public_message(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) => Self::BadRequest(msg),
            err @ LedgerError::NotFound { .. } => Self::NotFound(err.to_string()),
            err @ LedgerError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            LedgerError::InsufficientQuantity {
                key,
                held,
                requested,
            } => Self::InsufficientQuantity {
                key,
                held: held.to_string(),
                requested: requested.to_string(),
            },
            err @ (LedgerError::Read(_) | LedgerError::Write(_)) => Self::Internal(err.to_string()),
        }
    }
}

impl From<intercompany_store::StoreError> for ApiError {
    fn from(err: intercompany_store::StoreError) -> Self {
        match err {
            err @ intercompany_store::StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            intercompany_store::StoreError::Database(msg)
            | intercompany_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
