//! Probe execution on top of the tool runner.
//!
//! A probe is one named external command. Every probe yields a
//! [`ProbeResult`] no matter what happened: a missing executable becomes
//! exit code [`EXIT_NOT_FOUND`], a timeout becomes [`EXIT_TIMED_OUT`].

use super::tool_runner::{ToolConfig, ToolError, ToolRunner};
use serde::{Deserialize, Serialize};
use sk_bundle::{ArtifactError, ArtifactReader, ArtifactWriter, ProbeRecord, RunManifest};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Exit code reported when the executable cannot be started.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code reported when the probe exceeded its timeout.
pub const EXIT_TIMED_OUT: i32 = 124;

/// Outcome of a single probe invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub name: String,
    pub argv: Vec<String>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub timed_out: bool,
    pub truncated: bool,
}

impl ProbeResult {
    /// Result for a probe whose executable could not be started.
    pub fn not_found(name: &str, argv: &[&str], message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            argv: argv.iter().map(|s| s.to_string()).collect(),
            exit_code: EXIT_NOT_FOUND,
            stdout: String::new(),
            stderr: message.into(),
            duration_ms: 0,
            timed_out: false,
            truncated: false,
        }
    }

    /// True when the probe exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn to_record(&self) -> ProbeRecord {
        ProbeRecord {
            argv: self.argv.clone(),
            returncode: self.exit_code,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            duration_ms: self.duration_ms,
            timed_out: self.timed_out,
            truncated: self.truncated,
        }
    }

    pub fn from_record(name: &str, record: ProbeRecord) -> Self {
        Self {
            name: name.to_string(),
            argv: record.argv,
            exit_code: record.returncode,
            stdout: record.stdout,
            stderr: record.stderr,
            duration_ms: record.duration_ms,
            timed_out: record.timed_out,
            truncated: record.truncated,
        }
    }
}

/// Seam between the document builder and whatever actually runs commands.
pub trait CommandExecutor {
    /// Run one probe. `timeout` of `None` uses the executor default.
    fn execute(&mut self, name: &str, argv: &[&str], timeout: Option<Duration>) -> ProbeResult;

    /// Whether `program` can be found on this host.
    fn is_available(&self, program: &str) -> bool;

    /// Directory debug artifacts are being written to, if any.
    fn artifacts_dir(&self) -> Option<&Path> {
        None
    }
}

/// Executes probes on the live host, optionally recording artifacts.
pub struct ProbeRunner {
    tools: ToolRunner,
    artifacts: Option<ArtifactWriter>,
}

impl ProbeRunner {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            tools: ToolRunner::new(config),
            artifacts: None,
        }
    }

    /// Record every probe into `writer`.
    pub fn with_artifacts(mut self, writer: ArtifactWriter) -> Self {
        self.artifacts = Some(writer);
        self
    }

    /// Finish the artifact run, writing the final manifest.
    pub fn finish(self) -> Option<RunManifest> {
        let writer = self.artifacts?;
        match writer.finish() {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(error = %e, "failed to finalize artifact manifest");
                None
            }
        }
    }

    fn run_probe(&self, name: &str, argv: &[&str], timeout: Option<Duration>) -> ProbeResult {
        match self.tools.run(argv, timeout) {
            Ok(output) => {
                let exit_code = if output.timed_out {
                    EXIT_TIMED_OUT
                } else {
                    output.exit_code.unwrap_or(EXIT_NOT_FOUND)
                };
                ProbeResult {
                    name: name.to_string(),
                    argv: argv.iter().map(|s| s.to_string()).collect(),
                    exit_code,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    duration_ms: output.duration.as_millis() as u64,
                    timed_out: output.timed_out,
                    truncated: output.truncated,
                }
            }
            Err(e @ (ToolError::NotFound(_) | ToolError::Rejected(_))) => {
                debug!(probe = name, error = %e, "probe executable unavailable");
                ProbeResult::not_found(name, argv, e.to_string())
            }
            Err(e) => {
                warn!(probe = name, error = %e, "probe failed to start");
                ProbeResult::not_found(name, argv, e.to_string())
            }
        }
    }
}

impl CommandExecutor for ProbeRunner {
    fn execute(&mut self, name: &str, argv: &[&str], timeout: Option<Duration>) -> ProbeResult {
        debug!(probe = name, argv = ?argv, "starting probe");
        let result = self.run_probe(name, argv, timeout);

        if result.timed_out {
            warn!(probe = name, duration_ms = result.duration_ms, "probe timed out");
        }
        info!(
            probe = name,
            exit_code = result.exit_code,
            duration_ms = result.duration_ms,
            truncated = result.truncated,
            "probe complete"
        );

        if let Some(writer) = self.artifacts.as_mut() {
            if let Err(e) = writer.write_probe(name, &result.to_record()) {
                warn!(probe = name, error = %e, "failed to write probe artifact");
            }
        }

        result
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn artifacts_dir(&self) -> Option<&Path> {
        self.artifacts.as_ref().map(|w| w.dir())
    }
}

/// Replays probe results recorded in an artifacts directory.
///
/// Probes without a record behave as if the executable were missing.
pub struct ReplayExecutor {
    dir: PathBuf,
    records: BTreeMap<String, ProbeRecord>,
    programs: BTreeSet<String>,
}

impl ReplayExecutor {
    /// Load and verify every record in `dir`.
    pub fn open(dir: &Path) -> Result<Self, ArtifactError> {
        let reader = ArtifactReader::open(dir)?;
        let mut records = BTreeMap::new();
        for name in reader.probe_names()? {
            if let Some(record) = reader.read_verified(&name)? {
                records.insert(name, record);
            }
        }
        let programs = records
            .values()
            .filter(|r| r.returncode != EXIT_NOT_FOUND)
            .filter_map(|r| r.argv.first().cloned())
            .collect();

        info!(dir = %dir.display(), probes = records.len(), "Loaded replay records");
        Ok(Self {
            dir: dir.to_path_buf(),
            records,
            programs,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn probe_count(&self) -> usize {
        self.records.len()
    }
}

impl CommandExecutor for ReplayExecutor {
    fn execute(&mut self, name: &str, argv: &[&str], _timeout: Option<Duration>) -> ProbeResult {
        match self.records.get(name) {
            Some(record) => {
                debug!(probe = name, exit_code = record.returncode, "replaying probe");
                ProbeResult::from_record(name, record.clone())
            }
            None => ProbeResult::not_found(name, argv, format!("no recorded artifact for probe {name}")),
        }
    }

    fn is_available(&self, program: &str) -> bool {
        self.programs.contains(program)
    }
}
