//! Shared test utilities for integration tests
//!
//! Provides a temporary container layout (template, fragments, supervisor
//! directory) and a host that performs file operations for real but records
//! commands instead of running them.

use odoo_entrypoint::environment::EnvSnapshot;
use odoo_entrypoint::error::EntrypointError;
use odoo_entrypoint::host::{Host, HostCommand, SystemHost};
use odoo_entrypoint::settings::{ResolvedSettings, Settings};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Supervisor program file used by the layout.
pub const SUPERVISOR_CONF: &str = "[program:odoo]\ncommand=/home/odoo/instance/odoo/odoo-bin -c /home/odoo/.openerp_serverrc\nautostart=true\nautorestart=true\n";

/// Host that delegates filesystem work to [`SystemHost`] and records commands.
#[derive(Default)]
pub struct RecordingHost {
    pub commands: RefCell<Vec<HostCommand>>,
    pub autostart_calls: RefCell<Vec<bool>>,
    /// Program whose invocation fails.
    pub fail_program: Option<String>,
}

impl RecordingHost {
    pub fn failing(program: &str) -> Self {
        Self {
            fail_program: Some(program.to_string()),
            ..Self::default()
        }
    }

    pub fn rendered_commands(&self) -> Vec<String> {
        self.commands.borrow().iter().map(ToString::to_string).collect()
    }
}

impl Host for RecordingHost {
    fn copy_template(&self, src: &Path, dst: &Path) -> Result<(), EntrypointError> {
        SystemHost.copy_template(src, dst)
    }

    fn ensure_dir(&self, path: &Path) -> Result<bool, EntrypointError> {
        SystemHost.ensure_dir(path)
    }

    fn run_command(&self, command: &HostCommand) -> Result<(), EntrypointError> {
        self.commands.borrow_mut().push(command.clone());
        if self.fail_program.as_deref() == Some(command.program.as_str()) {
            return Err(EntrypointError::Command {
                command: command.to_string(),
                status: "exit status: 1".to_string(),
                stderr: "operation not permitted".to_string(),
            });
        }
        Ok(())
    }

    fn set_autostart(&self, dir: &Path, enabled: bool) -> Result<(), EntrypointError> {
        self.autostart_calls.borrow_mut().push(enabled);
        SystemHost.set_autostart(dir, enabled)
    }
}

/// Temporary copy of the image layout.
pub struct Layout {
    pub temp: TempDir,
    pub settings: Settings,
}

impl Layout {
    /// Layout with `template` as the configuration template and an empty
    /// fragment directory.
    pub fn new(template: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let external = root.join("external_files");
        fs::create_dir_all(external.join("odoocfg")).unwrap();
        fs::write(external.join("openerp_serverrc"), template).unwrap();

        let supervisor = root.join("etc").join("supervisor").join("conf.d");
        fs::create_dir_all(&supervisor).unwrap();
        fs::write(supervisor.join("odoo.conf"), SUPERVISOR_CONF).unwrap();

        let mut settings = Settings::default();
        settings.paths.template = external.join("openerp_serverrc");
        settings.paths.fragments_dir = external.join("odoocfg");
        settings.paths.config_file = root.join("home").join("odoo").join(".openerp_serverrc");
        settings.paths.filestore = root
            .join("home")
            .join("odoo")
            .join(".local/share/Odoo/filestore");
        settings.paths.supervisor_dir = supervisor;
        settings.paths.ssh_dir = root.join("home").join("odoo").join(".ssh");

        Self { temp, settings }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn add_fragment(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.settings.paths.fragments_dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn resolve(&self, env: &EnvSnapshot) -> ResolvedSettings {
        self.settings.resolve(env)
    }

    pub fn config_contents(&self, env: &EnvSnapshot) -> String {
        fs::read_to_string(self.resolve(env).config_file).unwrap()
    }

    pub fn supervisor_contents(&self) -> String {
        fs::read_to_string(self.settings.paths.supervisor_dir.join("odoo.conf")).unwrap()
    }
}
