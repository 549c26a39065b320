//! Unified error types for the session ledger.
//!
//! Error codes:
//! - VALID_001: required ingest field missing or blank
//! - VALID_002: ingest field present but malformed
//! - STORE_001: ledger store failure

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Required field missing or blank
    MissingField,
    /// VALID_002: Field present but malformed
    InvalidFormat,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField => "VALID_001",
            Self::InvalidFormat => "VALID_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Store error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// STORE_001: Failed to read or write the session ledger
    LedgerFailed,
}

impl StoreErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LedgerFailed => "STORE_001",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        500
    }
}

/// Unified error type for the session ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Ledger store error with code. The whole reconcile or query that hit
    /// it has been rolled back; nothing was partially applied.
    #[error("[{code}] {message}")]
    Persistence {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("malformed payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a ledger store error.
    pub fn persistence(code: StoreErrorCode, msg: impl Into<String>) -> Self {
        Self::Persistence {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Persistence { http_status, .. } => *http_status,
            Self::Validation(_) => 400,
            Self::MissingField(_) => 400,
            Self::Serialization(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for this error, if any.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Persistence { code, .. } => Some(code),
            Self::MissingField(_) => Some(ValidationErrorCode::MissingField.code()),
            Self::Validation(_) | Self::Serialization(_) => {
                Some(ValidationErrorCode::InvalidFormat.code())
            }
            Self::Internal(_) => None,
        }
    }
}
