//! Error types for expenseweb-core
//!
//! `SourceError` is what a data source reports for a failed remote call.
//! The session never propagates it; every failure degrades to a local
//! fallback. `CoreError` covers lookups and payload decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Expense not found in the local collection
    NotFound,
    /// List payload has an unexpected shape
    InvalidPayload,
    /// Base URL missing or unusable
    InvalidBaseUrl,
    /// Connection failed
    NetworkError,
    /// Non-2xx response
    HttpStatus,
    /// Response body could not be decoded
    DecodeError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::InvalidPayload => write!(f, "INVALID_PAYLOAD"),
            ErrorCode::InvalidBaseUrl => write!(f, "INVALID_BASE_URL"),
            ErrorCode::NetworkError => write!(f, "NETWORK_ERROR"),
            ErrorCode::HttpStatus => write!(f, "HTTP_STATUS"),
            ErrorCode::DecodeError => write!(f, "DECODE_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Failure reported by an `ExpenseSource`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Invalid API base URL")]
    InvalidBaseUrl,

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("API error {status} {reason}: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Invalid response body: {message}")]
    Decode { message: String },
}

impl SourceError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            SourceError::InvalidBaseUrl => ErrorCode::InvalidBaseUrl,
            SourceError::Network { .. } => ErrorCode::NetworkError,
            SourceError::Status { .. } => ErrorCode::HttpStatus,
            SourceError::Decode { .. } => ErrorCode::DecodeError,
        }
    }
}

/// Main error type for expenseweb-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Expense not found: {id}")]
    NotFound { id: String },

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InvalidPayload { .. } => ErrorCode::InvalidPayload,
            CoreError::Source(source) => source.code(),
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::NotFound { id } => {
                details = details.with_detail(serde_json::json!({ "expense_id": id }));
                details = details.with_suggestion(
                    "Reload the page; the list may have changed.".to_string(),
                );
                details = details.with_suggestion(
                    "Use the /api/expenses endpoint to list all expenses.".to_string(),
                );
            }
            CoreError::InvalidPayload { message } => {
                details = details.with_detail(serde_json::json!({ "payload_message": message }));
                details = details.with_suggestion(
                    "The API must return an array or an object with an `items` array.".to_string(),
                );
            }
            CoreError::Source(SourceError::InvalidBaseUrl) => {
                details = details.with_suggestion(
                    "Set api.base_url to an http(s) URL in the config file.".to_string(),
                );
            }
            CoreError::Source(SourceError::Status { status, .. }) => {
                details = details.with_detail(serde_json::json!({ "status": status }));
            }
            CoreError::Source(SourceError::Network { .. }) => {
                details = details.with_suggestion(
                    "Check that the API is running and reachable from this host.".to_string(),
                );
            }
            CoreError::Source(SourceError::Decode { .. }) => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================
