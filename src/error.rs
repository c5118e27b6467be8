//! Error types for the rentdash pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`AuthError`] - credential acquisition/refresh errors
//! - [`SheetsError`] - tabular data source errors
//! - [`ValidationError`] - required-field validation errors
//! - [`PipelineError`] - top-level fetch/transform orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Authentication Errors
// =============================================================================

/// Errors while obtaining or refreshing an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token file missing or unreadable.
    #[error("Cannot read token store: {0}")]
    IoError(#[from] std::io::Error),

    /// Token file contents are not a valid stored token.
    #[error("Invalid stored token: {0}")]
    InvalidToken(String),

    /// Token expired and no refresh token is available.
    #[error("Token expired and no refresh token available")]
    NotRefreshable,

    /// The refresh request to the OAuth token endpoint failed.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
}

// =============================================================================
// Data Source Errors
// =============================================================================

/// Errors from the spreadsheet data source.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// HTTP request failed.
    #[error("Sheets request failed: {0}")]
    HttpError(String),

    /// No spreadsheet document with the given name is visible.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The worksheet does not exist or returned no data.
    #[error("Worksheet not found or empty: {0}")]
    WorksheetNotFound(String),

    /// The API responded with a non-success status.
    #[error("Sheets API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Invalid Sheets response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A required field failed to parse.
///
/// Raised for the numeric columns the pipeline depends on; malformed dates
/// never produce this error, they degrade to null fields instead.
#[derive(Debug, Error)]
#[error("Invalid value for column '{column}' in row '{row}': {message}")]
pub struct ValidationError {
    /// Identifier of the offending row (booking id, or 1-based index).
    pub row: String,
    /// Source column name.
    pub column: String,
    /// What went wrong.
    pub message: String,
}

impl ValidationError {
    pub fn new(
        row: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level fetch/transform orchestration errors.
///
/// This is the main error type returned by the report-building entry points.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Credential error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Data source error.
    #[error("Sheets error: {0}")]
    Sheets(#[from] SheetsError),

    /// Required-field validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for data source operations.
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // SheetsError -> PipelineError
        let sheets_err = SheetsError::DocumentNotFound("General".into());
        let pipeline_err: PipelineError = sheets_err.into();
        assert!(pipeline_err.to_string().contains("General"));

        // ValidationError -> PipelineError
        let validation_err = ValidationError::new("BK-1", "Length of Stay", "not numeric");
        let pipeline_err: PipelineError = validation_err.into();
        assert!(pipeline_err.to_string().contains("Length of Stay"));

        // PipelineError -> ServerError
        let server_err: ServerError = pipeline_err.into();
        assert!(server_err.to_string().contains("BK-1"));
    }

    #[test]
    fn test_validation_error_format() {
        let err = ValidationError::new("BK-42", "Revenue From Fees", "expected a number, got 'n/a'");
        let msg = err.to_string();
        assert!(msg.contains("BK-42"));
        assert!(msg.contains("Revenue From Fees"));
        assert!(msg.contains("n/a"));
    }
}
