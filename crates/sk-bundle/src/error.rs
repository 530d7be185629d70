//! Error types for artifact operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or reading debug artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Checksum verification failed
    #[error("checksum mismatch for '{path}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// Artifact directory does not exist
    #[error("artifact directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Probe name cannot be used as a file stem
    #[error("invalid probe name: {0:?}")]
    InvalidProbeName(String),

    /// Corrupted manifest
    #[error("corrupted manifest: {0}")]
    CorruptedManifest(String),

    /// Nothing to pack
    #[error("artifact directory has no probe records: {0}")]
    EmptyDirectory(PathBuf),
}

/// Result type alias for artifact operations.
pub type Result<T> = std::result::Result<T, ArtifactError>;
