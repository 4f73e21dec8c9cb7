//! CLI parse: clap types for the entrypoint. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Odoo container entrypoint - prepares the server configuration at boot
#[derive(Parser)]
#[command(name = "odoo-entrypoint")]
#[command(about = "Prepare the Odoo configuration file and supervisor autostart at container boot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file path (overrides /etc/odoo-entrypoint/settings.toml)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, short = 'q', default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file; default: stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare the configuration file and set supervisor autostart
    Run,
    /// Show what the environment resolves to without touching any file
    Inspect {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
