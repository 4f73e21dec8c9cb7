//! Odoo Entrypoint CLI Binary
//!
//! Runs at container boot before supervisord starts Odoo.

use clap::Parser;
use odoo_entrypoint::cli::{Cli, RunContext};
use odoo_entrypoint::environment::EnvSnapshot;
use odoo_entrypoint::logging::{init_logging, LoggingConfig};
use odoo_entrypoint::settings::SettingsLoader;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();
    let env = EnvSnapshot::capture();

    let settings = match SettingsLoader::load_optional(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", odoo_entrypoint::cli::map_error(&e));
            process::exit(1);
        }
    };

    // Initialize logging early
    let logging_config = build_logging_config(&cli, settings.logging.clone());
    if let Err(e) = init_logging(&logging_config, &env) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Odoo entrypoint starting");

    let context = RunContext::new(&settings, env);
    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", odoo_entrypoint::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and the settings file.
/// Precedence: CLI flags override settings file override defaults.
fn build_logging_config(cli: &Cli, mut config: LoggingConfig) -> LoggingConfig {
    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }
    config
}
