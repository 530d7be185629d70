//! Artifact reader for inspecting and replaying collection runs.
//!
//! Directories written without a `run.json` (older collectors) are still
//! readable; records are then returned without checksum verification.

use crate::writer::sanitize_probe_name;
use crate::{ArtifactError, ProbeRecord, Result, RunManifest, ARTIFACT_SCHEMA_VERSION, MANIFEST_FILE_NAME};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reader over an artifacts directory.
pub struct ArtifactReader {
    dir: PathBuf,
    manifest: Option<RunManifest>,
}

impl ArtifactReader {
    /// Open an artifacts directory, loading `run.json` when present.
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(ArtifactError::DirectoryNotFound(dir.to_path_buf()));
        }

        let manifest = match fs::read_to_string(dir.join(MANIFEST_FILE_NAME)) {
            Ok(json) => {
                let manifest = RunManifest::from_json(&json)
                    .map_err(|e| ArtifactError::CorruptedManifest(e.to_string()))?;
                manifest.validate()?;
                if manifest.artifact_version != ARTIFACT_SCHEMA_VERSION {
                    warn!(
                        artifact_version = %manifest.artifact_version,
                        supported = %ARTIFACT_SCHEMA_VERSION,
                        "Artifact version mismatch"
                    );
                }
                Some(manifest)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        info!(
            dir = %dir.display(),
            run_id = manifest.as_ref().map(|m| m.run_id.as_str()).unwrap_or("-"),
            "Artifact directory opened"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest(&self) -> Option<&RunManifest> {
        self.manifest.as_ref()
    }

    /// Probe names available in the directory, sorted.
    pub fn probe_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = match &self.manifest {
            Some(m) => m.files.iter().map(|f| f.probe.clone()).collect(),
            None => fs::read_dir(&self.dir)?
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name != MANIFEST_FILE_NAME)
                .filter_map(|name| name.strip_suffix(".json").map(str::to_string))
                .collect(),
        };
        names.sort();
        Ok(names)
    }

    fn probe_path(&self, probe: &str) -> Result<PathBuf> {
        let file_name = match self.manifest.as_ref().and_then(|m| m.find_probe(probe)) {
            Some(entry) => entry.path.clone(),
            None => format!("{}.json", sanitize_probe_name(probe)?),
        };
        Ok(self.dir.join(file_name))
    }

    fn read_bytes(&self, probe: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.probe_path(probe)?) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a probe record without verification.
    ///
    /// Returns `Ok(None)` when the run has no record for the probe.
    pub fn read_probe(&self, probe: &str) -> Result<Option<ProbeRecord>> {
        match self.read_bytes(probe)? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Read a probe record, checking it against the manifest checksum.
    pub fn read_verified(&self, probe: &str) -> Result<Option<ProbeRecord>> {
        let data = match self.read_bytes(probe)? {
            Some(data) => data,
            None => return Ok(None),
        };

        if let Some(entry) = self.manifest.as_ref().and_then(|m| m.find_probe(probe)) {
            if !entry.verify(&data) {
                return Err(ArtifactError::ChecksumMismatch {
                    path: entry.path.clone(),
                    expected: entry.sha256.clone(),
                    actual: crate::FileEntry::compute_checksum(&data),
                });
            }
            debug!(probe, "Verified probe artifact");
        }

        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Verify every file listed in the manifest. Returns the count verified.
    pub fn verify_all(&self) -> Result<usize> {
        let Some(manifest) = &self.manifest else {
            return Err(ArtifactError::CorruptedManifest(format!(
                "{} not present in {}",
                MANIFEST_FILE_NAME,
                self.dir.display()
            )));
        };

        for entry in &manifest.files {
            let data = fs::read(self.dir.join(&entry.path))?;
            if !entry.verify(&data) {
                return Err(ArtifactError::ChecksumMismatch {
                    path: entry.path.clone(),
                    expected: entry.sha256.clone(),
                    actual: crate::FileEntry::compute_checksum(&data),
                });
            }
        }
        info!(files = manifest.files.len(), "All artifacts verified");
        Ok(manifest.files.len())
    }
}
