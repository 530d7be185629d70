//! Artifact record and manifest types.
//!
//! The manifest is the source of truth for a run's artifacts, providing:
//! - Run metadata (run id, host, timestamps)
//! - Per-probe file listing with SHA-256 checksums

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Current artifact layout version.
pub const ARTIFACT_SCHEMA_VERSION: &str = "1.0.0";

/// Manifest file name within the artifacts directory.
pub const MANIFEST_FILE_NAME: &str = "run.json";

/// Raw record of one probe invocation.
///
/// Field names follow the on-disk format consumed by existing tooling
/// (`returncode` rather than `exit_code`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub argv: Vec<String>,
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub truncated: bool,
}

impl ProbeRecord {
    /// Create a record with no timing information.
    pub fn new(
        argv: Vec<String>,
        returncode: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            argv,
            returncode,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration_ms: 0,
            timed_out: false,
            truncated: false,
        }
    }
}

/// Per-run manifest written as `run.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Artifact layout version.
    pub artifact_version: String,

    /// Correlation id of the collection run.
    pub run_id: String,

    /// Host the run was collected on.
    pub host: String,

    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Version of the collector that wrote the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,

    /// Probe files with checksums.
    pub files: Vec<FileEntry>,
}

impl RunManifest {
    /// Create a new manifest stamped with the current time.
    pub fn new(run_id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            artifact_version: ARTIFACT_SCHEMA_VERSION.to_string(),
            run_id: run_id.into(),
            host: host.into(),
            started_at: Utc::now(),
            finished_at: None,
            tool_version: None,
            files: Vec::new(),
        }
    }

    /// Set the collector version.
    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = Some(version.into());
        self
    }

    /// Add or replace the entry for a probe.
    pub fn upsert_file(&mut self, entry: FileEntry) {
        match self.files.iter_mut().find(|f| f.probe == entry.probe) {
            Some(existing) => *existing = entry,
            None => self.files.push(entry),
        }
    }

    /// Find the entry for a probe.
    pub fn find_probe(&self, probe: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.probe == probe)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    /// Sort files for deterministic ordering.
    pub fn sort_files(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Validate the manifest structure.
    pub fn validate(&self) -> crate::Result<()> {
        if self.run_id.is_empty() {
            return Err(crate::ArtifactError::CorruptedManifest(
                "run_id is empty".to_string(),
            ));
        }
        for file in &self.files {
            if file.path.is_empty() || file.probe.is_empty() {
                return Err(crate::ArtifactError::CorruptedManifest(
                    "file entry has empty path or probe".to_string(),
                ));
            }
            if file.sha256.len() != 64 {
                return Err(crate::ArtifactError::CorruptedManifest(format!(
                    "file '{}' has invalid checksum length",
                    file.path
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Probe file entry in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Probe name the file was written for.
    pub probe: String,

    /// File name relative to the artifacts directory.
    pub path: String,

    /// SHA-256 checksum (64 hex characters).
    pub sha256: String,

    pub bytes: u64,

    /// Exit code recorded in the file, for quick scanning of a run.
    pub returncode: i32,
}

impl FileEntry {
    /// Compute SHA-256 checksum of data.
    pub fn compute_checksum(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Verify the checksum against data.
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::compute_checksum(data) == self.sha256
    }
}
