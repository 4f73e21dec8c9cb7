//! CLI presentation: text and JSON renderings of run and inspect results.

use crate::entrypoint::{Classification, RunReport};
use crate::error::EntrypointError;
use crate::settings::ResolvedSettings;
use serde_json::json;

pub fn format_run_report(report: &RunReport) -> String {
    format!(
        "Odoo configuration ready: instance={} role={} fragments={} overrides={} updated/{} added preset={} sentry={} admin_password={} autostart={}",
        report.instance_type,
        report.role,
        report.fragments_merged,
        report.overrides.updated,
        report.overrides.inserted,
        if report.role_preset_applied { "applied" } else { "none" },
        if report.monitoring_configured { "configured" } else { "off" },
        if report.password_regenerated { "generated" } else { "kept" },
        report.autostart,
    )
}

pub fn format_inspect_text(classification: &Classification, settings: &ResolvedSettings) -> String {
    let mut s = format!(
        "Instance type: {}\nContainer role: {}\nAutostart: {}\nConfig file: {}\nFilestore: {}\nUser: {}",
        classification.instance_type,
        classification.role,
        classification.autostart,
        settings.config_file.display(),
        settings.filestore.display(),
        settings.user,
    );
    if classification.overrides.is_empty() {
        s.push_str("\n\nOverrides: none");
    } else {
        s.push_str(&format!("\n\nOverrides ({}):", classification.overrides.len()));
        for (key, value) in &classification.overrides {
            s.push_str(&format!("\n  {} = {}", key, redact(key, value)));
        }
    }
    s
}

pub fn format_inspect_json(
    classification: &Classification,
    settings: &ResolvedSettings,
) -> Result<String, EntrypointError> {
    let overrides: serde_json::Map<String, serde_json::Value> = classification
        .overrides
        .iter()
        .map(|(key, value)| (key.clone(), json!(redact(key, value))))
        .collect();
    let out = json!({
        "instance_type": classification.instance_type,
        "role": classification.role,
        "autostart": classification.autostart,
        "overrides": overrides,
        "settings": settings,
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| EntrypointError::Settings(format!("Failed to render JSON: {}", e)))
}

/// Hide secrets carried in overrides.
fn redact<'a>(key: &str, value: &'a str) -> &'a str {
    if key.contains("passw") || key.contains("secret") || key.contains("token") {
        "********"
    } else {
        value
    }
}
