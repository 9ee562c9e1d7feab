/*============================================================
  Synavera Project: Trivy Installer
  Module: trivy_installer::runner
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Abstract external command execution behind a capability so
    the probe, download and package-manager stages can be driven
    by the host or by deterministic fakes.

  Security / Safety Notes:
    Commands are spawned directly without a shell; arguments are
    passed verbatim and never interpolated into a command line.

  Dependencies:
    tokio::process for async command execution, async-trait for
    the object-safe runner capability.

  Operational Scope:
    Every subprocess the installer launches flows through a
    `CommandRunner`.

  Revision History:
    2026-10-16 COD  Extracted command runner capability.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Reusable helpers for external command diagnostics
============================================================*/

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{InstallerError, Result};

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit status, `-1` when terminated by a signal.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Capability for launching external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion, capturing its output.
    ///
    /// A non-zero exit is reported through `CommandOutput::status`, not as
    /// an error; errors are reserved for failures to launch at all.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;

    /// Run the command and treat a non-zero exit as `CommandFailure`.
    async fn run_checked(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let output = self.run(invocation).await?;
        if !output.success() {
            return Err(InstallerError::CommandFailure {
                command: invocation.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Runner that spawns real processes on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|err| map_spawn_error(err, &invocation.program))?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn map_spawn_error(err: io::Error, command: &str) -> InstallerError {
    if err.kind() == io::ErrorKind::NotFound {
        InstallerError::CommandMissing {
            command: command.into(),
        }
    } else {
        InstallerError::Runtime(format!("Failed to spawn {command}: {err}"))
    }
}
