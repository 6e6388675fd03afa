use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// ── Domain errors ──────────────────────────────────────────────────────────

/// Why a new link could not be created.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("Target URL must be an absolute http:// or https:// URL")]
    InvalidTargetUrl,

    #[error("Code must be 6-8 alphanumeric characters")]
    InvalidCodeFormat,

    #[error("Code '{0}' already exists")]
    CodeAlreadyExists(String),

    #[error("Failed to generate a unique code after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// Why a short code could not be resolved to its target.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Short link '{0}' not found")]
    CodeNotFound(String),

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

// ── HTTP mapping ───────────────────────────────────────────────────────────

/// JSON body returned by every API endpoint on failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable description.
    pub error: String,
    /// Machine-readable kind, e.g. `INVALID_CODE_FORMAT`.
    pub kind: &'static str,
}

/// Error type for the JSON API handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest { kind: &'static str, message: String },
    NotFound(String),
    Conflict(String),
    /// Logged in full, returned to the client as a generic message.
    Internal(String),
}

impl ApiError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::BadRequest { kind, message } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    kind,
                },
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: message,
                    kind: "CODE_NOT_FOUND",
                },
            ),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: message,
                    kind: "CODE_ALREADY_EXISTS",
                },
            ),
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal server error".into(),
                        kind: "INTERNAL_ERROR",
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<AllocationError> for ApiError {
    fn from(e: AllocationError) -> Self {
        match e {
            AllocationError::InvalidTargetUrl => ApiError::BadRequest {
                kind: "INVALID_TARGET_URL",
                message: e.to_string(),
            },
            AllocationError::InvalidCodeFormat => ApiError::BadRequest {
                kind: "INVALID_CODE_FORMAT",
                message: e.to_string(),
            },
            AllocationError::CodeAlreadyExists(_) => ApiError::Conflict(e.to_string()),
            AllocationError::AllocationExhausted { .. } => ApiError::Internal(e.to_string()),
            AllocationError::Store(e) => ApiError::Internal(format!("store error: {e:?}")),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::CodeNotFound(_) => ApiError::NotFound(e.to_string()),
            ResolveError::Store(e) => ApiError::Internal(format!("store error: {e:?}")),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(format!("store error: {e:?}"))
    }
}
