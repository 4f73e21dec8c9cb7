//! Policy rules applied to the loaded Odoo configuration.
//!
//! Applied in this order by the entrypoint: environment overrides, role
//! preset, monitoring integration, hard defaults. Later steps win.

use crate::environment::{parse_bool, ContainerRole, InstanceType};
use crate::store::{ConfigStore, DEFAULT_SECTION};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Default location of the Odoo sources reported to Sentry.
pub const SENTRY_ODOO_DIR: &str = "/home/odoo/instance/odoo";

/// Length of a generated admin password.
pub const ADMIN_PASSWORD_LEN: usize = 64;

/// Symbols a generated admin password is drawn from. Excludes whitespace, quotes
/// and characters with meaning in INI files or shells.
const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!%+-.@^_~";

const WEAK_ADMIN_PASSWORD: &str = "admin";

/// Counts of keys touched by [`apply_overrides`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverrideSummary {
    pub updated: usize,
    pub inserted: usize,
}

/// Apply environment overrides: update a key in the first section that already
/// holds it, otherwise add it to the default section.
pub fn apply_overrides<S>(store: &mut S, overrides: &BTreeMap<String, String>) -> OverrideSummary
where
    S: ConfigStore + ?Sized,
{
    let mut summary = OverrideSummary::default();
    for (key, value) in overrides {
        match store.find_key(key) {
            Some(section) => {
                debug!(%section, %key, "Updating configuration key from environment");
                store.set(&section, key, value);
                summary.updated += 1;
            }
            None => {
                debug!(section = DEFAULT_SECTION, %key, "Adding configuration key from environment");
                store.set(DEFAULT_SECTION, key, value);
                summary.inserted += 1;
            }
        }
    }
    summary
}

const WORKER_PRESET: &[(&str, &str)] = &[
    ("http_enable", "True"),
    ("max_cron_threads", "0"),
    ("workers", "0"),
    ("xmlrpcs", "False"),
];

const CRON_PRESET: &[(&str, &str)] = &[
    ("http_enable", "False"),
    ("max_cron_threads", "1"),
    ("workers", "0"),
    ("xmlrpcs", "False"),
    ("xmlrpc", "False"),
];

const LONGPOLL_PRESET: &[(&str, &str)] = &[
    ("http_enable", "False"),
    ("max_cron_threads", "0"),
    ("workers", "2"),
    ("xmlrpcs", "False"),
];

/// Service settings for each container role.
fn role_preset(role: &ContainerRole) -> Option<&'static [(&'static str, &'static str)]> {
    match role {
        ContainerRole::Worker => Some(WORKER_PRESET),
        ContainerRole::Cron => Some(CRON_PRESET),
        ContainerRole::Longpoll => Some(LONGPOLL_PRESET),
        ContainerRole::Unknown(_) | ContainerRole::Unset => None,
    }
}

/// Apply the service toggles of `role`. Returns whether a preset matched.
pub fn apply_role_preset<S>(store: &mut S, role: &ContainerRole) -> bool
where
    S: ConfigStore + ?Sized,
{
    let Some(preset) = role_preset(role) else {
        if let ContainerRole::Unknown(raw) = role {
            warn!(role = %raw, "Unknown container type, no preset applied");
        }
        return false;
    };
    info!(%role, "Applying container role preset");
    for (key, value) in preset {
        store.set(DEFAULT_SECTION, key, value);
    }
    true
}

/// When `sentry_enabled` is true, point Sentry at the Odoo sources and tag
/// events with the instance type. Returns whether the fields were set.
pub fn apply_monitoring_integration<S>(
    store: &mut S,
    instance_type: &InstanceType,
    odoo_dir: &str,
) -> bool
where
    S: ConfigStore + ?Sized,
{
    let Some(raw) = store
        .get(DEFAULT_SECTION, "sentry_enabled")
        .map(str::to_string)
    else {
        return false;
    };
    match parse_bool(&raw) {
        Some(true) => {
            store.set(DEFAULT_SECTION, "sentry_odoo_dir", odoo_dir);
            store.set(DEFAULT_SECTION, "sentry_environment", instance_type.as_str());
            info!(environment = %instance_type, "Sentry integration configured");
            true
        }
        Some(false) => false,
        None => {
            warn!(value = %raw, "Unparsable sentry_enabled value, leaving Sentry disabled");
            false
        }
    }
}

/// What [`apply_hard_defaults`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HardDefaults {
    pub password_regenerated: bool,
}

/// Pin the container ports, leave log rotation to supervisor and refuse a weak
/// admin password.
pub fn apply_hard_defaults<S>(store: &mut S) -> HardDefaults
where
    S: ConfigStore + ?Sized,
{
    store.set(DEFAULT_SECTION, "xmlrpc_port", "8069");
    store.set(DEFAULT_SECTION, "longpolling_port", "8072");
    store.set(DEFAULT_SECTION, "logrotate", "False");

    let weak = matches!(
        store.get(DEFAULT_SECTION, "admin_passwd"),
        None | Some("") | Some(WEAK_ADMIN_PASSWORD)
    );
    if weak {
        info!("Replacing default admin password with a random one");
        store.set(DEFAULT_SECTION, "admin_passwd", &generate_admin_password());
    }

    HardDefaults {
        password_regenerated: weak,
    }
}

/// Random admin password from the OS-seeded thread RNG.
pub fn generate_admin_password() -> String {
    let mut rng = rand::rng();
    (0..ADMIN_PASSWORD_LEN)
        .map(|_| {
            let idx = rng.random_range(0..PASSWORD_ALPHABET.len());
            PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}
