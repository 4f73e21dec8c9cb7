//! Built-in defaults: the Odoo container image layout.

use crate::mutator::SENTRY_ODOO_DIR;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

pub const TEMPLATE: &str = "/external_files/openerp_serverrc";
pub const FRAGMENTS_DIR: &str = "/external_files/odoocfg";
pub const CONFIG_FILE: &str = "/home/odoo/.openerp_serverrc";
pub const FILESTORE: &str = "/home/odoo/.local/share/Odoo/filestore";
pub const SUPERVISOR_DIR: &str = "/etc/supervisor/conf.d";
pub const SSH_DIR: &str = "/home/odoo/.ssh";
pub const USER: &str = "odoo";

/// Create a Config builder with the image defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("paths.template", TEMPLATE)?
        .set_default("paths.fragments_dir", FRAGMENTS_DIR)?
        .set_default("paths.config_file", CONFIG_FILE)?
        .set_default("paths.filestore", FILESTORE)?
        .set_default("paths.supervisor_dir", SUPERVISOR_DIR)?
        .set_default("paths.ssh_dir", SSH_DIR)?
        .set_default("odoo.user", USER)?
        .set_default("odoo.sentry_odoo_dir", SENTRY_ODOO_DIR)
}
