//! Prefixed configuration overrides carried in environment variables.
//!
//! Any variable whose name starts with `odoorc_` (in any case) overrides the
//! configuration key named by the rest of the variable, lower-cased:
//! `ODOORC_DB_HOST=db` sets `db_host = db`.

use std::collections::BTreeMap;

/// Reserved prefix of override variables, compared case-insensitively.
pub const OVERRIDE_PREFIX: &str = "odoorc_";

/// Keep the `KEY=VALUE` entries whose key carries the override prefix.
///
/// Keys keep their original case. Entries without `=` are dropped; the value is
/// everything after the first `=`.
pub fn filter_prefixed<I, S>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut res = BTreeMap::new();
    for var in vars {
        let Some((key, value)) = var.as_ref().split_once('=') else {
            continue;
        };
        if key.to_lowercase().starts_with(OVERRIDE_PREFIX) {
            res.insert(key.to_string(), value.to_string());
        }
    }
    res
}

/// Filter the override variables and normalize their keys to configuration
/// keys: lower-cased with the prefix stripped.
///
/// A variable named exactly like the prefix has no key and is dropped.
///
/// When two variables normalize to the same key, the one whose original name
/// sorts last wins. Upper-case letters sort first, so `odoorc_port` beats
/// `ODOORC_PORT`.
pub fn extract_vars<I, S>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    filter_prefixed(vars)
        .into_iter()
        .filter_map(|(key, value)| {
            let lowered = key.to_lowercase();
            let normalized = lowered
                .strip_prefix(OVERRIDE_PREFIX)
                .unwrap_or(&lowered)
                .to_string();
            (!normalized.is_empty()).then_some((normalized, value))
        })
        .collect()
}
