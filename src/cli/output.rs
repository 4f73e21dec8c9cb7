//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::EntrypointError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &EntrypointError) -> String {
    format!("odoo-entrypoint: {}", e)
}
