//! Logging System
//!
//! Structured logging using the `tracing` crate. Level, format and destination
//! come from the settings file, CLI flags and `ENTRYPOINT_LOG*` variables.

use crate::environment::EnvSnapshot;
use crate::error::EntrypointError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directives, e.g. `debug` or `odoo_entrypoint=trace`.
pub const LOG_ENV: &str = "ENTRYPOINT_LOG";
/// `json` or `text`.
pub const LOG_FORMAT_ENV: &str = "ENTRYPOINT_LOG_FORMAT";
/// `stdout`, `stderr` or `file`.
pub const LOG_OUTPUT_ENV: &str = "ENTRYPOINT_LOG_OUTPUT";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Disable all logging
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (required if output is "file")
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format only, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

/// Stdout carries command output, so logs go to stderr by default.
fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
    File,
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. Environment variables (ENTRYPOINT_LOG, ENTRYPOINT_LOG_FORMAT, ENTRYPOINT_LOG_OUTPUT)
/// 2. CLI arguments (already folded into `config`)
/// 3. Settings file
/// 4. Defaults
pub fn init_logging(config: &LoggingConfig, env: &EnvSnapshot) -> Result<(), EntrypointError> {
    if !config.enabled && env.non_empty(LOG_ENV).is_none() {
        return Ok(());
    }

    let filter = build_env_filter(config, env)?;
    let format = determine_format(config, env)?;
    let output = determine_output(config, env)?;

    let writer = match output {
        Output::Stdout => BoxMakeWriter::new(std::io::stdout),
        Output::Stderr => BoxMakeWriter::new(std::io::stderr),
        Output::File => {
            let log_file = config.file.clone().ok_or_else(|| {
                EntrypointError::Logging("Log output is 'file' but no log file is set".to_string())
            })?;
            if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EntrypointError::Logging(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .map_err(|e| {
                    EntrypointError::Logging(format!(
                        "Failed to open log file {:?}: {}",
                        log_file, e
                    ))
                })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };
    let use_color = config.color && output != Output::File;

    let base_subscriber = Registry::default().with(filter);
    let result = if format == "json" {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    } else {
        base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(writer),
            )
            .try_init()
    };

    result.map_err(|e| EntrypointError::Logging(format!("Failed to install subscriber: {}", e)))
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: &LoggingConfig, env: &EnvSnapshot) -> Result<EnvFilter, EntrypointError> {
    if let Some(directives) = env.non_empty(LOG_ENV) {
        return EnvFilter::try_new(directives)
            .map_err(|e| EntrypointError::Logging(format!("Invalid {}: {}", LOG_ENV, e)));
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| EntrypointError::Logging(format!("Invalid log level: {}", e)))?;

    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| EntrypointError::Logging(format!("Invalid log directive: {}", e)))?,
        );
    }

    Ok(filter)
}

/// Determine output format from config or environment
fn determine_format(config: &LoggingConfig, env: &EnvSnapshot) -> Result<String, EntrypointError> {
    if let Some(format) = env.non_empty(LOG_FORMAT_ENV) {
        if format == "json" || format == "text" {
            return Ok(format.to_string());
        }
    }

    let format = config.format.as_str();
    if format != "json" && format != "text" {
        return Err(EntrypointError::Logging(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }

    Ok(format.to_string())
}

/// Determine output destination from config or environment
fn determine_output(config: &LoggingConfig, env: &EnvSnapshot) -> Result<Output, EntrypointError> {
    if let Some(output) = env.non_empty(LOG_OUTPUT_ENV) {
        return parse_output(output);
    }
    parse_output(&config.output)
}

fn parse_output(output: &str) -> Result<Output, EntrypointError> {
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        "file" => Ok(Output::File),
        _ => Err(EntrypointError::Logging(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
            output
        ))),
    }
}
