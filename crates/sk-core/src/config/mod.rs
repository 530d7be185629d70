//! Configuration loading for spektor collection runs.
//!
//! This module handles:
//! - The `spektor.toml` collection settings file
//! - Config resolution order (explicit path > env dir > XDG > defaults)
//! - Environment overrides (`SPEKTOR_EXTRAS`)
//! - Sanity checks on numeric limits

use crate::collect::parsers::DEFAULT_PACKAGE_LIMIT;
use crate::collect::tool_runner::{ToolConfig, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT_SECS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default XDG config directory name.
const CONFIG_DIR_NAME: &str = "spektor";

/// Config file name inside a config directory.
pub const CONFIG_FILE_NAME: &str = "spektor.toml";

/// Environment variable naming a config directory.
pub const CONFIG_DIR_ENV: &str = "SPEKTOR_CONFIG";

/// Environment variable with a comma-separated extras list.
pub const EXTRAS_ENV: &str = "SPEKTOR_EXTRAS";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid TOML in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Settings for one collection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct CollectConfig {
    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Cap on captured bytes per output stream.
    pub max_output_bytes: usize,

    /// Write per-probe debug artifacts.
    pub debug: bool,

    /// Where debug artifacts go.
    pub artifacts_dir: PathBuf,

    /// Optional probe groups: `docker`, `systemd`, `kvm`.
    pub extras: Vec<String>,

    /// Maximum package items reported.
    pub package_limit: usize,

    /// Run probes under nice/ionice.
    pub use_nice: bool,

    pub os_release_path: PathBuf,
    pub init_comm_path: PathBuf,
    pub tpm_class_dir: PathBuf,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            debug: false,
            artifacts_dir: PathBuf::from("artifacts"),
            extras: Vec::new(),
            package_limit: DEFAULT_PACKAGE_LIMIT,
            use_nice: false,
            os_release_path: PathBuf::from("/etc/os-release"),
            init_comm_path: PathBuf::from("/proc/1/comm"),
            tpm_class_dir: PathBuf::from("/sys/class/tpm"),
        }
    }
}

impl CollectConfig {
    /// Check numeric limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_output_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_output_bytes",
                message: "must be positive".to_string(),
            });
        }
        if self.package_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "package_limit",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Per-probe timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Runner settings derived from this config.
    pub fn tool_config(&self) -> ToolConfig {
        ToolConfig {
            default_timeout: self.timeout(),
            max_output_bytes: self.max_output_bytes,
            use_nice: self.use_nice,
            #[cfg(target_os = "linux")]
            use_ionice: self.use_nice,
            ..ToolConfig::default()
        }
    }

    /// Replace `extras` from a comma-separated list.
    pub fn set_extras_from_list(&mut self, list: &str) {
        self.extras = parse_extras(list);
    }

    /// Apply environment overrides using `lookup` for variable access.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup(EXTRAS_ENV) {
            debug!(extras = %list, "extras overridden from environment");
            self.set_extras_from_list(&list);
        }
    }
}

/// Split a comma-separated extras list, lowercased, blanks dropped.
pub fn parse_extras(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().to_ascii_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Resolved configuration with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub collect: CollectConfig,

    /// File the settings came from (None if using defaults).
    pub source_path: Option<PathBuf>,
}

/// Configuration resolution options.
#[derive(Debug, Default)]
pub struct ConfigOptions {
    /// Explicit config file (highest priority; must exist).
    pub config_path: Option<PathBuf>,

    /// Explicit config directory.
    pub config_dir: Option<PathBuf>,
}

/// Load configuration with the standard resolution order.
///
/// Resolution order (highest to lowest priority):
/// 1. Explicit config file (via ConfigOptions)
/// 2. Explicit config directory, then `SPEKTOR_CONFIG`
/// 3. XDG config home (~/.config/spektor/spektor.toml)
/// 4. Built-in defaults
///
/// `SPEKTOR_EXTRAS` is applied on top of whatever was loaded.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let mut resolved = load_file_config(options)?;
    resolved
        .collect
        .apply_env_overrides(|key| std::env::var(key).ok());
    resolved.collect.validate()?;
    Ok(resolved)
}

fn load_file_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    if let Some(path) = &options.config_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
        return Ok(ResolvedConfig {
            collect: load_config_file(path)?,
            source_path: Some(path.clone()),
        });
    }

    let candidate = resolve_config_dir(options).join(CONFIG_FILE_NAME);
    if candidate.exists() {
        return Ok(ResolvedConfig {
            collect: load_config_file(&candidate)?,
            source_path: Some(candidate),
        });
    }

    debug!(path = %candidate.display(), "no config file, using defaults");
    Ok(ResolvedConfig {
        collect: CollectConfig::default(),
        source_path: None,
    })
}

/// Resolve the config directory using the standard resolution order.
fn resolve_config_dir(options: &ConfigOptions) -> PathBuf {
    if let Some(dir) = &options.config_dir {
        return dir.clone();
    }

    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }

    let xdg_config = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });

    xdg_config.join(CONFIG_DIR_NAME)
}

/// Load collection settings from a specific TOML file.
pub fn load_config_file(path: &Path) -> Result<CollectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config: CollectConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    config.extras = config
        .extras
        .iter()
        .flat_map(|item| parse_extras(item))
        .collect();
    Ok(config)
}
