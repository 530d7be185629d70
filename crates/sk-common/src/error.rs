//! Error types for Spektor.
//!
//! Collection itself never fails: probe and parse failures degrade to
//! defaults inside the core. These errors cover the ambient surface around
//! it (configuration, artifact I/O, loading documents from disk) and carry:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation hints for humans
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 61,
//!   "category": "io",
//!   "message": "JSON serialization error: expected value at line 1 column 1",
//!   "remediation": "..."
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Spektor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Probe orchestration errors.
    Collection,
    /// Debug artifact errors.
    Artifacts,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Collection => write!(f, "collection"),
            ErrorCategory::Artifacts => write!(f, "artifacts"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Spektor.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    // Collection errors (20-29)
    #[error("collection failed: {0}")]
    Collection(String),

    // Artifact errors (30-39)
    #[error("artifact error: {0}")]
    Artifacts(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::SchemaValidation(_) => 11,
            Error::Collection(_) => 20,
            Error::Artifacts(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::SchemaValidation(_) => ErrorCategory::Config,
            Error::Collection(_) => ErrorCategory::Collection,
            Error::Artifacts(_) => ErrorCategory::Artifacts,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Check spektor.toml syntax, or remove it to fall back to defaults.",
            Error::SchemaValidation(_) => {
                "The document does not match this build's schema version. Re-collect with 'spektor collect'."
            }
            Error::Collection(_) => "Re-run with '-v --debug' and inspect the per-probe artifacts.",
            Error::Artifacts(_) => {
                "Check that the artifacts directory is writable, or choose another with '--raw-dir'."
            }
            Error::Io(_) => "Check the path, permissions and free disk space, then retry.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub remediation: String,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            remediation: err.remediation().to_string(),
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
