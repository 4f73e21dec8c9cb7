//! Host side effects: template copy, directories, permission commands and the
//! supervisor autostart flag.
//!
//! The entrypoint reaches the operating system only through [`Host`], so the
//! orchestration can be driven against a recording fake in tests.

use crate::error::EntrypointError;
use crate::files::{read_text, write_config_file};
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// External command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl HostCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Operating system operations the entrypoint depends on.
pub trait Host {
    /// Copy the template file to `dst`, replacing it.
    fn copy_template(&self, src: &Path, dst: &Path) -> Result<(), EntrypointError>;

    /// Create `path` and its parents with mode `0o777` when absent. Returns
    /// whether the directory was created.
    fn ensure_dir(&self, path: &Path) -> Result<bool, EntrypointError>;

    /// Run `command` to completion; a non-zero exit is an error.
    fn run_command(&self, command: &HostCommand) -> Result<(), EntrypointError>;

    /// Set `autostart` in every supervisor program file of `dir`.
    fn set_autostart(&self, dir: &Path, enabled: bool) -> Result<(), EntrypointError>;
}

/// [`Host`] backed by the real filesystem and process table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl Host for SystemHost {
    fn copy_template(&self, src: &Path, dst: &Path) -> Result<(), EntrypointError> {
        if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| EntrypointError::file(parent, e))?;
        }
        fs::copy(src, dst).map_err(|e| EntrypointError::file(src, e))?;
        debug!(src = %src.display(), dst = %dst.display(), "Copied configuration template");
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> Result<bool, EntrypointError> {
        if path.exists() {
            return Ok(false);
        }
        fs::create_dir_all(path).map_err(|e| EntrypointError::file(path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o777))
                .map_err(|e| EntrypointError::file(path, e))?;
        }

        info!(path = %path.display(), "Created directory");
        Ok(true)
    }

    fn run_command(&self, command: &HostCommand) -> Result<(), EntrypointError> {
        debug!(%command, "Running command");
        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .map_err(|e| EntrypointError::CommandSpawn {
                command: command.to_string(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(%command, stdout = %stdout.trim(), "Command output");
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            warn!(%command, status = %output.status, "Command failed");
            return Err(EntrypointError::Command {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        if !stderr.trim().is_empty() {
            debug!(%command, stderr = %stderr.trim(), "Command error output");
        }
        Ok(())
    }

    fn set_autostart(&self, dir: &Path, enabled: bool) -> Result<(), EntrypointError> {
        if !dir.is_dir() {
            return Err(EntrypointError::file(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "supervisor directory not found"),
            ));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                EntrypointError::file(path, e.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some("conf")
            {
                continue;
            }
            let contents = read_text(path)?;
            let (rewritten, changed) = rewrite_autostart(&contents, enabled);
            if changed {
                debug!(file = %path.display(), enabled, "Updating supervisor autostart");
                write_config_file(path, &rewritten)?;
            }
        }

        info!(dir = %dir.display(), enabled, "Supervisor autostart set");
        Ok(())
    }
}

/// Replace every `autostart` line of a supervisor program file. Returns the new
/// contents and whether any line changed.
pub fn rewrite_autostart(contents: &str, enabled: bool) -> (String, bool) {
    let replacement = format!("autostart={}", enabled);
    let mut changed = false;
    let lines: Vec<&str> = contents
        .split('\n')
        .map(|line| {
            if is_autostart_line(line) && line.trim() != replacement {
                changed = true;
                replacement.as_str()
            } else {
                line
            }
        })
        .collect();
    (lines.join("\n"), changed)
}

fn is_autostart_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("autostart")
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}
