//! Host inventory collection.
//!
//! This module provides the collection layer:
//! - Tool runner for safe, bounded external command execution
//! - Probe runner and replay executor behind the [`CommandExecutor`] seam
//! - Pure parsers for each probe's output format
//! - The document builder that drives the probes in order

pub mod builder;
pub mod parsers;
pub mod runner;
pub mod tool_runner;

pub use builder::{
    collect, collect_host, local_hostname, probe_catalog, CollectOptions, ProbeSpec,
    FIRMWARE_PROBE_TIMEOUT,
};
pub use runner::{
    CommandExecutor, ProbeResult, ProbeRunner, ReplayExecutor, EXIT_NOT_FOUND, EXIT_TIMED_OUT,
};
pub use tool_runner::{
    ToolConfig, ToolError, ToolOutput, ToolRunner,
    DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT_SECS,
};
