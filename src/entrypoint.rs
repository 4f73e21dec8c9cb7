//! Startup sequence: prepare files, load the configuration, classify the
//! environment, apply the policy rules, persist and set supervisor autostart.
//!
//! The sequence runs once per container boot and stops at the first failure.
//! The configuration is written exactly once, after every rule has been applied.

use crate::environment::{
    classify_instance, container_role, extract_vars, ContainerRole, EnvSnapshot, InstanceType,
};
use crate::error::EntrypointError;
use crate::files::{merge_fragments, MergeOutcome};
use crate::host::{Host, HostCommand};
use crate::mutator::{
    apply_hard_defaults, apply_monitoring_integration, apply_overrides, apply_role_preset,
    OverrideSummary,
};
use crate::settings::ResolvedSettings;
use crate::store::{ConfigStore, IniDocument};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info};

/// Steps of the startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Init,
    FilesPrepared,
    StoreLoaded,
    VarsClassified,
    Mutated,
    Persisted,
    AutostartSet,
    Done,
    /// The step after `at` failed.
    Failed { at: &'static str },
}

impl RunState {
    fn name(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::FilesPrepared => "files_prepared",
            RunState::StoreLoaded => "store_loaded",
            RunState::VarsClassified => "vars_classified",
            RunState::Mutated => "mutated",
            RunState::Persisted => "persisted",
            RunState::AutostartSet => "autostart_set",
            RunState::Done => "done",
            RunState::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Failed { at } => write!(f, "failed after {}", at),
            other => f.write_str(other.name()),
        }
    }
}

/// Environment-derived inputs of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub instance_type: InstanceType,
    pub role: ContainerRole,
    pub overrides: BTreeMap<String, String>,
    pub autostart: bool,
}

/// Read the override set, instance type, role and autostart flag from `env`.
pub fn classify(env: &EnvSnapshot) -> Result<Classification, EntrypointError> {
    let overrides = extract_vars(env.as_assignments());
    let instance_type = classify_instance(env)?;
    Ok(Classification {
        instance_type,
        role: container_role(env),
        overrides,
        autostart: env.autostart(),
    })
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub instance_type: InstanceType,
    pub role: ContainerRole,
    pub fragments_merged: usize,
    pub filestore_created: bool,
    pub overrides: OverrideSummary,
    pub role_preset_applied: bool,
    pub monitoring_configured: bool,
    pub password_regenerated: bool,
    pub autostart: bool,
}

/// Permission fixes run on every boot, in order.
pub fn permission_commands(settings: &ResolvedSettings) -> Vec<HostCommand> {
    let owner = format!("{0}:{0}", settings.user);
    let filestore = settings.filestore.display().to_string();
    // A relative single-component path has the empty path as parent.
    let filestore_parent = match settings.filestore.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => Path::new("/"),
    }
    .display()
    .to_string();

    vec![
        HostCommand::new("chmod", ["ugo+rwxt", "/tmp"]),
        HostCommand::new("chmod", ["ugo+rw", "/var/log/supervisor"]),
        HostCommand::new("chown", [owner.clone(), filestore_parent]),
        HostCommand::new("chown", [owner.clone(), filestore]),
        HostCommand::new(
            "chown",
            ["-R".to_string(), owner, settings.ssh_dir.display().to_string()],
        ),
    ]
}

/// Drives the startup sequence against a [`Host`].
pub struct Entrypoint<'a, H: Host> {
    host: &'a H,
    settings: &'a ResolvedSettings,
    env: &'a EnvSnapshot,
    state: RunState,
}

impl<'a, H: Host> Entrypoint<'a, H> {
    pub fn new(host: &'a H, settings: &'a ResolvedSettings, env: &'a EnvSnapshot) -> Self {
        Self {
            host,
            settings,
            env,
            state: RunState::Init,
        }
    }

    /// Current state of the sequence.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the whole sequence. On error the state is `Failed` and nothing after
    /// the failing step has run.
    pub fn run(&mut self) -> Result<RunReport, EntrypointError> {
        info!(config = %self.settings.config_file.display(), "Preparing the configuration");
        match self.run_steps() {
            Ok(report) => {
                self.state = RunState::Done;
                Ok(report)
            }
            Err(e) => {
                let at = self.state.name();
                error!(state = at, error = %e, "Configuration failed");
                self.state = RunState::Failed { at };
                Err(e)
            }
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!(from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    fn run_steps(&mut self) -> Result<RunReport, EntrypointError> {
        let (fragments_merged, filestore_created) = self.prepare_files()?;
        self.advance(RunState::FilesPrepared);

        info!("Setting up the config file");
        let mut store = IniDocument::load(&self.settings.config_file)?;
        self.advance(RunState::StoreLoaded);

        let classification = classify(self.env)?;
        debug!(
            instance_type = %classification.instance_type,
            role = %classification.role,
            overrides = classification.overrides.len(),
            "Environment classified"
        );
        self.advance(RunState::VarsClassified);

        let overrides = apply_overrides(&mut store, &classification.overrides);
        let role_preset_applied = apply_role_preset(&mut store, &classification.role);
        let monitoring_configured = apply_monitoring_integration(
            &mut store,
            &classification.instance_type,
            &self.settings.sentry_odoo_dir,
        );
        let defaults = apply_hard_defaults(&mut store);
        self.advance(RunState::Mutated);

        info!("Saving new Odoo configuration");
        store.persist(&self.settings.config_file)?;
        self.advance(RunState::Persisted);

        debug!(autostart = classification.autostart, "Autostart");
        self.host
            .set_autostart(&self.settings.supervisor_dir, classification.autostart)?;
        self.advance(RunState::AutostartSet);

        Ok(RunReport {
            instance_type: classification.instance_type,
            role: classification.role,
            fragments_merged,
            filestore_created,
            overrides,
            role_preset_applied,
            monitoring_configured,
            password_regenerated: defaults.password_regenerated,
            autostart: classification.autostart,
        })
    }

    fn prepare_files(&self) -> Result<(usize, bool), EntrypointError> {
        let settings = self.settings;
        self.host
            .copy_template(&settings.template, &settings.config_file)?;

        let fragments = match merge_fragments(&settings.config_file, &settings.fragments_dir)? {
            MergeOutcome::Merged { fragments } => fragments,
            MergeOutcome::Skipped => 0,
        };

        let created = self.host.ensure_dir(&settings.filestore)?;

        for command in permission_commands(settings) {
            self.host.run_command(&command)?;
        }

        Ok((fragments, created))
    }
}
