//! Settings file source: /etc/odoo-entrypoint/settings.toml or an explicit path.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Add the settings file at `path` to the builder.
///
/// An optional file that does not exist is skipped; a required one fails the build.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !required && !path.exists() {
        debug!(settings_path = %path.display(), "No settings file, using defaults");
        return Ok(builder);
    }
    Ok(builder.add_source(File::from(path).required(required)))
}
