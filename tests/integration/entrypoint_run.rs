//! Integration tests for the full startup sequence

use super::test_utils::{Layout, RecordingHost, SUPERVISOR_CONF};
use odoo_entrypoint::entrypoint::{Entrypoint, RunState};
use odoo_entrypoint::environment::{ContainerRole, EnvSnapshot, InstanceType};
use odoo_entrypoint::error::EntrypointError;
use odoo_entrypoint::store::{ConfigStore, IniDocument};

const TEMPLATE: &str = "\
[options]
admin_passwd = admin
db_host = localhost
db_port = 5432
xmlrpc_port = 9999
logrotate = True
sentry_enabled = True
";

fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
    EnvSnapshot::from_pairs(pairs.iter().copied())
}

#[test]
fn test_run_produces_configuration() {
    let layout = Layout::new(TEMPLATE);
    layout.add_fragment("10-queue.cfg", "[queue_job]\nchannels = root:1\n");
    let env = env(&[
        ("INSTANCE_TYPE", "develop"),
        ("ODOO_STAGE", "dev"),
        ("CONTAINER_TYPE", "worker"),
        ("ODOORC_DB_HOST", "postgres"),
        ("odoorc_channels", "root:4"),
        ("ODOORC_DBFILTER", "^%d$"),
        ("AUTOSTART", "false"),
    ]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    let mut entrypoint = Entrypoint::new(&host, &settings, &env);
    let report = entrypoint.run().unwrap();
    assert_eq!(entrypoint.state(), RunState::Done);

    assert_eq!(report.instance_type, InstanceType::Develop);
    assert_eq!(report.role, ContainerRole::Worker);
    assert_eq!(report.fragments_merged, 1);
    assert!(report.filestore_created);
    assert_eq!(report.overrides.updated, 2);
    assert_eq!(report.overrides.inserted, 1);
    assert!(report.role_preset_applied);
    assert!(report.monitoring_configured);
    assert!(report.password_regenerated);
    assert!(!report.autostart);

    let store = IniDocument::load(&settings.config_file).unwrap();
    assert_eq!(store.get("options", "db_host"), Some("postgres"));
    assert_eq!(store.get("options", "db_port"), Some("5432"));
    assert_eq!(store.get("options", "dbfilter"), Some("^%d$"));
    assert_eq!(store.get("queue_job", "channels"), Some("root:4"));
    assert_eq!(store.get("options", "channels"), None);
    assert_eq!(store.get("options", "http_enable"), Some("True"));
    assert_eq!(store.get("options", "workers"), Some("0"));
    assert_eq!(store.get("options", "xmlrpc_port"), Some("8069"));
    assert_eq!(store.get("options", "longpolling_port"), Some("8072"));
    assert_eq!(store.get("options", "logrotate"), Some("False"));
    assert_eq!(store.get("options", "sentry_environment"), Some("develop"));
    assert_eq!(
        store.get("options", "sentry_odoo_dir"),
        Some("/home/odoo/instance/odoo")
    );
    let password = store.get("options", "admin_passwd").unwrap();
    assert_ne!(password, "admin");
    assert!(password.len() >= 64);

    assert!(settings.filestore.is_dir());
    assert_eq!(*host.autostart_calls.borrow(), vec![false]);
    assert!(layout.supervisor_contents().contains("autostart=false"));
}

#[test]
fn test_run_records_permission_commands() {
    let layout = Layout::new(TEMPLATE);
    let env = env(&[("INSTANCE_TYPE", "production"), ("ODOO_USER", "erp")]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    Entrypoint::new(&host, &settings, &env).run().unwrap();

    let commands = host.rendered_commands();
    assert_eq!(commands.len(), 5);
    assert_eq!(commands[0], "chmod ugo+rwxt /tmp");
    assert_eq!(commands[1], "chmod ugo+rw /var/log/supervisor");
    assert_eq!(
        commands[3],
        format!("chown erp:erp {}", settings.filestore.display())
    );
    assert!(commands[4].starts_with("chown -R erp:erp "));
}

#[test]
fn test_run_without_fragment_dir() {
    let layout = Layout::new(TEMPLATE);
    std::fs::remove_dir(&layout.settings.paths.fragments_dir).unwrap();
    let env = env(&[("INSTANCE_TYPE", "test")]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    let report = Entrypoint::new(&host, &settings, &env).run().unwrap();
    assert_eq!(report.fragments_merged, 0);
    assert!(report.autostart);
    assert!(layout.supervisor_contents().contains("autostart=true"));
}

#[test]
fn test_config_file_env_override() {
    let layout = Layout::new(TEMPLATE);
    let target = layout.root().join("etc").join("odoo.conf");
    let target_str = target.display().to_string();
    let env = env(&[("INSTANCE_TYPE", "test"), ("ODOO_CONFIG_FILE", &target_str)]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    Entrypoint::new(&host, &settings, &env).run().unwrap();
    let store = IniDocument::load(&target).unwrap();
    assert_eq!(store.get("options", "xmlrpc_port"), Some("8069"));
    assert!(!layout.settings.paths.config_file.exists());
}

#[test]
fn test_instance_mismatch_fails_before_persisting() {
    let layout = Layout::new(TEMPLATE);
    let env = env(&[
        ("INSTANCE_TYPE", "test"),
        ("ODOO_STAGE", "dev"),
        ("ODOORC_DB_HOST", "postgres"),
    ]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    let mut entrypoint = Entrypoint::new(&host, &settings, &env);
    let err = entrypoint.run().unwrap_err();
    assert!(matches!(err, EntrypointError::InstanceMismatch { .. }));
    assert_eq!(entrypoint.state(), RunState::Failed { at: "store_loaded" });

    // The template was copied but no rule was applied.
    assert_eq!(layout.config_contents(&env).trim(), TEMPLATE.trim());
    assert!(host.autostart_calls.borrow().is_empty());
    assert_eq!(layout.supervisor_contents(), SUPERVISOR_CONF);
}

#[test]
fn test_missing_instance_type_fails() {
    let layout = Layout::new(TEMPLATE);
    let env = EnvSnapshot::default();
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    let err = Entrypoint::new(&host, &settings, &env).run().unwrap_err();
    assert!(matches!(err, EntrypointError::InstanceUndetermined));
}

#[test]
fn test_failed_command_aborts() {
    let layout = Layout::new(TEMPLATE);
    let env = env(&[("INSTANCE_TYPE", "test")]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::failing("chown");

    let mut entrypoint = Entrypoint::new(&host, &settings, &env);
    let err = entrypoint.run().unwrap_err();
    assert!(matches!(err, EntrypointError::Command { .. }));
    assert_eq!(entrypoint.state(), RunState::Failed { at: "init" });
    // chmod, chmod, then the failing chown; nothing after it.
    assert_eq!(host.commands.borrow().len(), 3);
    assert!(host.autostart_calls.borrow().is_empty());
}

#[test]
fn test_missing_template_fails() {
    let layout = Layout::new(TEMPLATE);
    std::fs::remove_file(&layout.settings.paths.template).unwrap();
    let env = env(&[("INSTANCE_TYPE", "test")]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    let err = Entrypoint::new(&host, &settings, &env).run().unwrap_err();
    assert!(matches!(err, EntrypointError::File { .. }));
    assert!(host.commands.borrow().is_empty());
}

#[test]
fn test_strong_password_is_kept_across_runs() {
    let layout = Layout::new("[options]\nadmin_passwd = 5tr0ng-and-l0ng\n");
    let env = env(&[("INSTANCE_TYPE", "production"), ("ODOO_STAGE", "production")]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    for _ in 0..2 {
        let report = Entrypoint::new(&host, &settings, &env).run().unwrap();
        assert!(!report.password_regenerated);
        let store = IniDocument::load(&settings.config_file).unwrap();
        assert_eq!(store.get("options", "admin_passwd"), Some("5tr0ng-and-l0ng"));
    }
}

#[test]
fn test_unparsable_sentry_flag_is_ignored() {
    let layout = Layout::new("[options]\nsentry_enabled = enabled\n");
    let env = env(&[("INSTANCE_TYPE", "production")]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    let report = Entrypoint::new(&host, &settings, &env).run().unwrap();
    assert!(!report.monitoring_configured);
    let store = IniDocument::load(&settings.config_file).unwrap();
    assert_eq!(store.get("options", "sentry_environment"), None);
}

#[test]
fn test_bare_prefix_variable_keeps_config_loadable() {
    let layout = Layout::new(TEMPLATE);
    let env = env(&[("INSTANCE_TYPE", "test"), ("ODOORC_", "x")]);
    let settings = layout.resolve(&env);
    let host = RecordingHost::default();

    let report = Entrypoint::new(&host, &settings, &env).run().unwrap();
    assert_eq!(report.overrides.updated + report.overrides.inserted, 0);

    let store = IniDocument::load(&settings.config_file).unwrap();
    assert_eq!(store.get("options", ""), None);
}
