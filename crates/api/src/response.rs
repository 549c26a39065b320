//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_core::{Disposition, UpsertOutcome};
use serde::{Deserialize, Serialize};

/// Success response for report ingestion.
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub status: String,
    pub disposition: Disposition,
    /// Stale open sessions the auto-close guard shut during this call.
    pub auto_closed: u64,
    pub timestamp: i64,
}

impl SyncResponse {
    pub fn from_outcome(outcome: UpsertOutcome) -> Self {
        Self {
            status: "success".to_string(),
            disposition: outcome.disposition,
            auto_closed: outcome.auto_closed,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// HTTP status matching the disposition.
    pub fn http_status(&self) -> StatusCode {
        match self.disposition {
            Disposition::Created => StatusCode::CREATED,
            Disposition::Updated => StatusCode::OK,
        }
    }
}

/// Success response for client signup sync.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub status: String,
    pub client_id: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub ledger_connected: bool,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }
}

/// API error type carrying the ledger error codes.
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_002", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "STORE_001", msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<ledger_core::Error> for ApiError {
    fn from(err: ledger_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match err.error_code() {
            Some(code) => ApiError::with_code(status, code, err.to_string()),
            None => ApiError::internal(err.to_string()),
        }
    }
}
