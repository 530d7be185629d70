//! Debug artifact writer/reader for spektor collection runs.
//!
//! When diagnostics are requested, every probe invocation is persisted as
//! its own JSON record so a run can be inspected or replayed later.
//!
//! # Directory Layout
//!
//! - `<probe>.json`: one [`ProbeRecord`] per probe (argv, exit code, streams)
//! - `run.json`: [`RunManifest`] with run id, host, timestamps and a SHA-256
//!   checksum per probe file
//!
//! A finished directory can be packed into a single ZIP archive with
//! [`pack_directory`] for handoff.
//!
//! # Example
//!
//! ```no_run
//! use sk_bundle::{ArtifactReader, ArtifactWriter, ProbeRecord};
//! use std::path::Path;
//!
//! let mut writer = ArtifactWriter::create(Path::new("artifacts"), "run-1234", "host-a").unwrap();
//! let record = ProbeRecord::new(vec!["uname".into(), "-r".into()], 0, "6.1.0\n", "");
//! writer.write_probe("uname_r", &record).unwrap();
//! writer.finish().unwrap();
//!
//! let reader = ArtifactReader::open(Path::new("artifacts")).unwrap();
//! let replayed = reader.read_verified("uname_r").unwrap();
//! assert_eq!(replayed.map(|r| r.returncode), Some(0));
//! ```

pub mod error;
pub mod manifest;
pub mod reader;
pub mod writer;

pub use error::{ArtifactError, Result};
pub use manifest::{
    FileEntry, ProbeRecord, RunManifest, ARTIFACT_SCHEMA_VERSION, MANIFEST_FILE_NAME,
};
pub use reader::ArtifactReader;
pub use writer::{pack_directory, sanitize_probe_name, ArtifactWriter};
