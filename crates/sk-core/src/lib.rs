//! Spektor core library.
//!
//! This library provides the host inventory pipeline:
//! - Probe execution with timeouts and output caps
//! - Parsers for each diagnostic command's output
//! - Document assembly and structural validation
//! - Configuration loading, logging and exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod collect;
pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod schema;
pub mod validate;

pub use collect::{collect, collect_host, CollectOptions, CommandExecutor, ProbeResult};
pub use validate::{validate, validate_value, ValidationReport};
