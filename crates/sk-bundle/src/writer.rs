//! Artifact writer for collection runs.
//!
//! Each probe record is flushed to disk as soon as it is written so a run
//! that aborts part-way still leaves usable artifacts behind.

use crate::{ArtifactError, FileEntry, ProbeRecord, Result, RunManifest, MANIFEST_FILE_NAME};
use chrono::Utc;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Map a probe name to a safe file stem.
///
/// Characters outside `[A-Za-z0-9_.-]` become `_`. Names that would escape
/// or hide inside the directory are rejected.
pub fn sanitize_probe_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        return Err(ArtifactError::InvalidProbeName(name.to_string()));
    }
    Ok(trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect())
}

/// Writes per-probe records and the run manifest into a directory.
pub struct ArtifactWriter {
    dir: PathBuf,
    manifest: RunManifest,
}

impl ArtifactWriter {
    /// Create the directory (and parents) and start a new run manifest.
    pub fn create(dir: &Path, run_id: impl Into<String>, host: impl Into<String>) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let manifest =
            RunManifest::new(run_id, host).with_tool_version(env!("CARGO_PKG_VERSION"));
        let writer = Self {
            dir: dir.to_path_buf(),
            manifest,
        };
        writer.write_manifest()?;
        info!(dir = %dir.display(), run_id = %writer.manifest.run_id, "Artifact directory ready");
        Ok(writer)
    }

    /// Directory artifacts are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest(&self) -> &RunManifest {
        &self.manifest
    }

    /// Persist one probe record as `<probe>.json`.
    ///
    /// Writing the same probe twice replaces the earlier record.
    pub fn write_probe(&mut self, probe: &str, record: &ProbeRecord) -> Result<PathBuf> {
        let stem = sanitize_probe_name(probe)?;
        let file_name = format!("{}.json", stem);
        let path = self.dir.join(&file_name);

        let json = serde_json::to_string_pretty(record)?;
        let data = json.as_bytes();
        fs::write(&path, data)?;

        self.manifest.upsert_file(FileEntry {
            probe: probe.to_string(),
            path: file_name,
            sha256: FileEntry::compute_checksum(data),
            bytes: data.len() as u64,
            returncode: record.returncode,
        });
        debug!(probe, path = %path.display(), bytes = data.len(), "Wrote probe artifact");
        Ok(path)
    }

    /// Stamp the finish time and write the final manifest.
    pub fn finish(mut self) -> Result<RunManifest> {
        self.manifest.finished_at = Some(Utc::now());
        self.manifest.sort_files();
        self.write_manifest()?;
        info!(
            dir = %self.dir.display(),
            files = self.manifest.file_count(),
            bytes = self.manifest.total_bytes(),
            "Artifact run finished"
        );
        Ok(self.manifest)
    }

    fn write_manifest(&self) -> Result<()> {
        let json = self.manifest.to_json()?;
        fs::write(self.dir.join(MANIFEST_FILE_NAME), json)?;
        Ok(())
    }
}

/// Pack every `.json` file in an artifacts directory into a ZIP archive.
///
/// Entries are added in name order so identical directories produce
/// identical archives. Returns the number of files packed.
pub fn pack_directory(dir: &Path, zip_path: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Err(ArtifactError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".json"))
        .collect();
    names.sort();

    if !names.iter().any(|n| n != MANIFEST_FILE_NAME) {
        return Err(ArtifactError::EmptyDirectory(dir.to_path_buf()));
    }

    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for name in &names {
        let data = fs::read(dir.join(name))?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&data)?;
    }
    zip.finish()?;

    info!(
        dir = %dir.display(),
        archive = %zip_path.display(),
        files = names.len(),
        "Packed artifact directory"
    );
    Ok(names.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_probe_name() {
        assert_eq!(sanitize_probe_name("packages_dpkg").unwrap(), "packages_dpkg");
        assert_eq!(sanitize_probe_name("runtime python3").unwrap(), "runtime_python3");
        assert_eq!(sanitize_probe_name("a/../b").unwrap(), "a_.._b");
        assert!(sanitize_probe_name("").is_err());
        assert!(sanitize_probe_name("..").is_err());
        assert!(sanitize_probe_name(".hidden").is_err());
    }

    #[test]
    fn test_write_probe_records_checksum() {
        let tmp = tempdir().unwrap();
        let mut writer = ArtifactWriter::create(tmp.path(), "run-1", "host-a").unwrap();
        let record = ProbeRecord::new(vec!["uname".into(), "-m".into()], 0, "x86_64\n", "");
        let path = writer.write_probe("uname_m", &record).unwrap();

        let data = fs::read(&path).unwrap();
        let entry = writer.manifest().find_probe("uname_m").unwrap();
        assert!(entry.verify(&data));
        assert_eq!(entry.path, "uname_m.json");
    }

    #[test]
    fn test_create_writes_manifest_immediately() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("nested").join("artifacts");
        let _writer = ArtifactWriter::create(&dir, "run-1", "host-a").unwrap();
        assert!(dir.join(MANIFEST_FILE_NAME).is_file());
    }

    #[test]
    fn test_finish_sets_finished_at() {
        let tmp = tempdir().unwrap();
        let writer = ArtifactWriter::create(tmp.path(), "run-1", "host-a").unwrap();
        let manifest = writer.finish().unwrap();
        assert!(manifest.finished_at.is_some());
    }

    #[test]
    fn test_pack_empty_directory_fails() {
        let tmp = tempdir().unwrap();
        let writer = ArtifactWriter::create(tmp.path(), "run-1", "host-a").unwrap();
        writer.finish().unwrap();

        let result = pack_directory(tmp.path(), &tmp.path().join("out.zip"));
        assert!(matches!(result, Err(ArtifactError::EmptyDirectory(_))));
    }

    #[test]
    fn test_pack_missing_directory_fails() {
        let tmp = tempdir().unwrap();
        let result = pack_directory(&tmp.path().join("missing"), &tmp.path().join("out.zip"));
        assert!(matches!(result, Err(ArtifactError::DirectoryNotFound(_))));
    }
}
