//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_inspect_json, format_inspect_text, format_run_report};
use crate::entrypoint::{classify, Entrypoint};
use crate::environment::EnvSnapshot;
use crate::error::EntrypointError;
use crate::host::{Host, SystemHost};
use crate::settings::{ResolvedSettings, Settings};

/// Runtime context for CLI execution: environment snapshot, resolved settings and host.
pub struct RunContext<H: Host = SystemHost> {
    env: EnvSnapshot,
    settings: ResolvedSettings,
    host: H,
}

impl RunContext<SystemHost> {
    /// Create a run context against the real system.
    pub fn new(settings: &Settings, env: EnvSnapshot) -> Self {
        Self::with_host(settings, env, SystemHost)
    }
}

impl<H: Host> RunContext<H> {
    /// Create a run context with a custom host.
    pub fn with_host(settings: &Settings, env: EnvSnapshot, host: H) -> Self {
        let settings = settings.resolve(&env);
        Self {
            env,
            settings,
            host,
        }
    }

    /// Resolved settings in use.
    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, EntrypointError> {
        match command {
            Commands::Run => {
                let report = Entrypoint::new(&self.host, &self.settings, &self.env).run()?;
                Ok(format_run_report(&report))
            }
            Commands::Inspect { format } => {
                let classification = classify(&self.env)?;
                if format == "json" {
                    format_inspect_json(&classification, &self.settings)
                } else {
                    Ok(format_inspect_text(&classification, &self.settings))
                }
            }
        }
    }
}
