//! Environment snapshot and the signals the entrypoint derives from it.
//!
//! The process environment is captured once into an [`EnvSnapshot`] and passed
//! explicitly to everything that reads it, so classification and filtering can
//! be exercised with fixed inputs.

pub mod instance;
pub mod vars;

pub use instance::{classify_instance, container_role, ContainerRole, InstanceType};
pub use vars::{extract_vars, filter_prefixed, OVERRIDE_PREFIX};

/// Primary instance-type signal, historically set by the deployment tooling.
pub const INSTANCE_TYPE_VAR: &str = "INSTANCE_TYPE";
/// Secondary instance-type signal, set by Odoo.sh style deployments.
pub const STAGE_VAR: &str = "ODOO_STAGE";
/// Role of this container (worker, cron, longpoll).
pub const CONTAINER_TYPE_VAR: &str = "CONTAINER_TYPE";
/// Override for the target configuration file path.
pub const CONFIG_FILE_VAR: &str = "ODOO_CONFIG_FILE";
/// Override for the filestore path. The name predates the filestore move.
pub const FILESTORE_VAR: &str = "CONFIGFILE_PATH";
/// Supervisor autostart toggle.
pub const AUTOSTART_VAR: &str = "AUTOSTART";
/// System user owning the Odoo files.
pub const USER_VAR: &str = "ODOO_USER";

/// Immutable view of the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    entries: Vec<(String, String)>,
}

impl EnvSnapshot {
    /// Capture the current process environment. Non UTF-8 names or values are
    /// decoded lossily.
    pub fn capture() -> Self {
        Self::from_pairs(std::env::vars_os().map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        }))
    }

    /// Build a snapshot from explicit pairs. Later pairs shadow earlier ones on lookup.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `name`, treating unset as the empty string.
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Non-empty value of `name`.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// All entries in capture order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Entries rendered as `NAME=value` assignments, in capture order.
    pub fn as_assignments(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect()
    }

    /// Autostart flag for the supervised process. Unset, empty or unparsable
    /// values keep autostart on.
    pub fn autostart(&self) -> bool {
        self.non_empty(AUTOSTART_VAR)
            .and_then(parse_bool)
            .unwrap_or(true)
    }
}

/// Parse a boolean with the vocabulary used by the deployment tooling:
/// `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
