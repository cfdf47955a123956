use crate::error::{AttributionError, Result};
use crate::git::{Shell, ShellCommand};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs commands as child processes of the current process
#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    cwd: Option<PathBuf>,
}

impl SystemShell {
    /// Run commands in the current working directory
    pub fn new() -> Self {
        SystemShell { cwd: None }
    }

    /// Run commands in `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        SystemShell {
            cwd: Some(dir.as_ref().to_path_buf()),
        }
    }

    fn command(&self, command: &ShellCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl Shell for SystemShell {
    fn run(&self, command: &ShellCommand) -> Result<String> {
        debug!("running $ {}", command);

        // stdin is closed so commands like `git shortlog` never wait on it
        let output = self.command(command).stdin(Stdio::null()).output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(AttributionError::ExternalCommand {
                command: command.to_string(),
                exit_code: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(stdout + &stderr)
    }

    fn run_interactive(&self, command: &ShellCommand) -> Result<()> {
        debug!("running interactively $ {}", command);

        let status = self.command(command).status()?;

        if !status.success() {
            return Err(AttributionError::ExternalCommand {
                command: command.to_string(),
                exit_code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        Ok(())
    }
}
