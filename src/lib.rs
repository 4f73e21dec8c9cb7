//! Odoo Entrypoint: container boot-time configuration
//!
//! Builds the Odoo server configuration file from the image template, fragment
//! files and `ODOORC_*` environment overrides, applies role and safety policies,
//! and toggles supervisor autostart.

pub mod cli;
pub mod entrypoint;
pub mod environment;
pub mod error;
pub mod files;
pub mod host;
pub mod logging;
pub mod mutator;
pub mod settings;
pub mod store;
