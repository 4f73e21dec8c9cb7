//! Entrypoint settings
//!
//! Paths and identities the entrypoint works with. Defaults match the Odoo
//! container image layout; an optional TOML settings file can move them, and a
//! few environment variables take precedence over both.

use crate::environment::{EnvSnapshot, CONFIG_FILE_VAR, FILESTORE_VAR, USER_VAR};
use crate::error::EntrypointError;
use crate::logging::LoggingConfig;
use crate::mutator::SENTRY_ODOO_DIR;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod defaults;
mod sources;

/// Settings file read when no explicit path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "/etc/odoo-entrypoint/settings.toml";

/// Root settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub paths: PathSettings,
    pub odoo: OdooSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Configuration template shipped with the image
    pub template: PathBuf,
    /// Directory of configuration fragments appended to the template
    pub fragments_dir: PathBuf,
    /// Configuration file Odoo is started with
    pub config_file: PathBuf,
    /// Odoo filestore
    pub filestore: PathBuf,
    /// Supervisor program directory
    pub supervisor_dir: PathBuf,
    /// SSH directory of the Odoo user
    pub ssh_dir: PathBuf,
}

/// Odoo process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdooSettings {
    /// System user owning the Odoo files
    pub user: String,
    /// Odoo source directory reported to Sentry
    pub sentry_odoo_dir: String,
}

/// Settings after environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSettings {
    pub template: PathBuf,
    pub fragments_dir: PathBuf,
    pub config_file: PathBuf,
    pub filestore: PathBuf,
    pub supervisor_dir: PathBuf,
    pub ssh_dir: PathBuf,
    pub user: String,
    pub sentry_odoo_dir: String,
}

impl Settings {
    /// Apply `ODOO_CONFIG_FILE`, `CONFIGFILE_PATH` and `ODOO_USER` on top of the
    /// loaded settings. Empty variables are ignored.
    pub fn resolve(&self, env: &EnvSnapshot) -> ResolvedSettings {
        let config_file = env
            .non_empty(CONFIG_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.paths.config_file.clone());
        let filestore = env
            .non_empty(FILESTORE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.paths.filestore.clone());
        let user = env
            .non_empty(USER_VAR)
            .map(str::to_string)
            .unwrap_or_else(|| self.odoo.user.clone());

        ResolvedSettings {
            template: self.paths.template.clone(),
            fragments_dir: self.paths.fragments_dir.clone(),
            config_file,
            filestore,
            supervisor_dir: self.paths.supervisor_dir.clone(),
            ssh_dir: self.paths.ssh_dir.clone(),
            user,
            sentry_odoo_dir: self.odoo.sentry_odoo_dir.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: PathSettings {
                template: PathBuf::from(defaults::TEMPLATE),
                fragments_dir: PathBuf::from(defaults::FRAGMENTS_DIR),
                config_file: PathBuf::from(defaults::CONFIG_FILE),
                filestore: PathBuf::from(defaults::FILESTORE),
                supervisor_dir: PathBuf::from(defaults::SUPERVISOR_DIR),
                ssh_dir: PathBuf::from(defaults::SSH_DIR),
            },
            odoo: OdooSettings {
                user: defaults::USER.to_string(),
                sentry_odoo_dir: SENTRY_ODOO_DIR.to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

/// Loads [`Settings`] from defaults and an optional settings file.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load defaults, then the default settings file if it exists.
    pub fn load() -> Result<Settings, EntrypointError> {
        let builder = defaults::builder_with_defaults()?;
        let builder = sources::settings_file::add_to_builder(
            builder,
            Path::new(DEFAULT_SETTINGS_FILE),
            false,
        )?;
        Self::build(builder)
    }

    /// Load defaults, then `path`, which must exist.
    pub fn load_from_file(path: &Path) -> Result<Settings, EntrypointError> {
        let builder = defaults::builder_with_defaults()?;
        let builder = sources::settings_file::add_to_builder(builder, path, true)?;
        Self::build(builder)
    }

    /// Load from an explicit path when given, the default location otherwise.
    pub fn load_optional(path: Option<&Path>) -> Result<Settings, EntrypointError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings, EntrypointError> {
        let settings = builder.build()?.try_deserialize::<Settings>()?;
        Ok(settings)
    }
}
