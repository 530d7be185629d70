//! spektor - host hardware and software inventory
//!
//! The main entry point, handling:
//! - Collection of the inventory document from the live host or a replay
//! - Validation of documents on disk
//! - JSON Schema export
//! - Listing of the probe battery

use clap::{Args, Parser, Subcommand};
use sk_bundle::pack_directory;
use sk_common::error::StructuredError;
use sk_common::{Document, Error, OutputFormat};
use sk_core::collect::{collect, collect_host, probe_catalog, CollectOptions, ReplayExecutor};
use sk_core::config::{load_config, CollectConfig, ConfigError, ConfigOptions};
use sk_core::exit_codes::ExitCode;
use sk_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use sk_core::schema::{available_schemas, generate_all_schemas, generate_schema, DEFAULT_SCHEMA};
use sk_core::validate::validate_value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// spektor - collect a schema-shaped inventory of this machine
#[derive(Parser)]
#[command(name = "spektor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to a spektor.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Output format for JSON payloads
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every probe and print the inventory document
    Collect(CollectArgs),

    /// Check a document on disk against the schema
    Validate(ValidateArgs),

    /// Print JSON Schema for output types
    Schema(SchemaArgs),

    /// List the probes collection may run
    Probes,
}

#[derive(Args, Debug)]
struct CollectArgs {
    /// Record every probe as a JSON artifact
    #[arg(long)]
    debug: bool,

    /// Artifact directory (implies --debug)
    #[arg(long, value_name = "DIR")]
    raw_dir: Option<PathBuf>,

    /// Per-probe timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Write the document here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Build the document from recorded artifacts instead of the live host
    #[arg(long, value_name = "DIR", conflicts_with_all = ["debug", "raw_dir"])]
    replay: Option<PathBuf>,

    /// Zip the artifact directory into FILE (implies --debug)
    #[arg(long, value_name = "FILE", conflicts_with = "replay")]
    bundle: Option<PathBuf>,

    /// Comma-separated opt-in probe groups (docker, systemd, kvm)
    #[arg(long, value_name = "LIST")]
    extras: Option<String>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Document to check
    file: PathBuf,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type to print (default: Document)
    name: Option<String>,

    /// List available types
    #[arg(long, conflicts_with_all = ["name", "all"])]
    list: bool,

    /// Print every schema keyed by type name
    #[arg(long, conflicts_with = "name")]
    all: bool,
}

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        (0..cli.global.verbose).fold(None, |level: Option<LogLevel>, _| {
            Some(level.unwrap_or_default().louder())
        })
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let exit_code = match &cli.command {
        Commands::Collect(args) => run_collect(&cli.global, args),
        Commands::Validate(args) => run_validate(&cli.global, args),
        Commands::Schema(args) => run_schema(&cli.global, args),
        Commands::Probes => run_probes(&cli.global),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_collect(global: &GlobalOpts, args: &CollectArgs) -> ExitCode {
    let options = ConfigOptions {
        config_path: global.config.clone(),
        config_dir: None,
    };
    let mut config = match load_config(&options) {
        Ok(resolved) => {
            if let Some(path) = &resolved.source_path {
                debug!(path = %path.display(), "loaded config");
            }
            resolved.collect
        }
        Err(e) => return output_config_error(&e),
    };
    apply_collect_args(&mut config, args);

    let doc = match &args.replay {
        Some(dir) => {
            let mut replay = match ReplayExecutor::open(dir) {
                Ok(replay) => replay,
                Err(e) => return output_error(&Error::Artifacts(e.to_string()), ExitCode::IoError),
            };
            info!(dir = %dir.display(), probes = replay.probe_count(), "replaying artifacts");
            collect(&CollectOptions::from_config(&config), &mut replay)
        }
        None => collect_host(&config),
    };

    if let Some(bundle) = &args.bundle {
        let Some(dir) = doc.debug.artifacts_dir.as_deref() else {
            return output_error(
                &Error::Artifacts("no artifacts were recorded".to_string()),
                ExitCode::IoError,
            );
        };
        match pack_directory(Path::new(dir), bundle) {
            Ok(files) => info!(path = %bundle.display(), files, "artifact bundle written"),
            Err(e) => return output_error(&Error::Artifacts(e.to_string()), ExitCode::IoError),
        }
    }

    if let Err(e) = emit(global.format, &doc, args.output.as_deref()) {
        return output_error(&e, ExitCode::IoError);
    }

    if doc.debug.validation_errors.is_some() {
        ExitCode::Invalid
    } else {
        ExitCode::Clean
    }
}

/// CLI flags take precedence over the config file and environment.
fn apply_collect_args(config: &mut CollectConfig, args: &CollectArgs) {
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(extras) = &args.extras {
        config.set_extras_from_list(extras);
    }
    if let Some(dir) = &args.raw_dir {
        config.artifacts_dir = dir.clone();
    }
    if args.debug || args.raw_dir.is_some() || args.bundle.is_some() {
        config.debug = true;
    }
}

fn emit(format: OutputFormat, doc: &Document, output: Option<&Path>) -> Result<(), Error> {
    let rendered = format.render(doc)?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))?;
            info!(path = %path.display(), "document written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_validate(global: &GlobalOpts, args: &ValidateArgs) -> ExitCode {
    let content = match std::fs::read_to_string(&args.file) {
        Ok(content) => content,
        Err(e) => return output_error(&Error::Io(e), ExitCode::IoError),
    };
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => return output_error(&Error::Json(e), ExitCode::Invalid),
    };

    let report = validate_value(&value);
    match global.format.render(&report) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => return output_error(&Error::Json(e), ExitCode::InternalError),
    }

    if report.valid {
        ExitCode::Clean
    } else {
        ExitCode::Invalid
    }
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> ExitCode {
    if args.list {
        for (name, description) in available_schemas() {
            println!("{name:<18} {description}");
        }
        return ExitCode::Clean;
    }

    let rendered = if args.all {
        global.format.render(&generate_all_schemas())
    } else {
        let name = args.name.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let Some(schema) = generate_schema(name) else {
            eprintln!("spektor: unknown schema type '{name}' (see 'spektor schema --list')");
            return ExitCode::ArgsError;
        };
        global.format.render(&schema)
    };

    match rendered {
        Ok(text) => {
            println!("{text}");
            ExitCode::Clean
        }
        Err(e) => output_error(&Error::Json(e), ExitCode::InternalError),
    }
}

fn run_probes(global: &GlobalOpts) -> ExitCode {
    match global.format.render(&probe_catalog()) {
        Ok(text) => {
            println!("{text}");
            ExitCode::Clean
        }
        Err(e) => output_error(&Error::Json(e), ExitCode::InternalError),
    }
}

/// Output a config error as structured JSON on stderr.
fn output_config_error(error: &ConfigError) -> ExitCode {
    let exit_code = match error {
        ConfigError::IoError { .. } => ExitCode::IoError,
        ConfigError::NotFound { .. }
        | ConfigError::ParseError { .. }
        | ConfigError::Invalid { .. } => ExitCode::ConfigError,
    };
    output_error(&Error::Config(error.to_string()), exit_code)
}

fn output_error(error: &Error, exit_code: ExitCode) -> ExitCode {
    eprintln!("{}", StructuredError::from(error).to_json());
    exit_code
}
