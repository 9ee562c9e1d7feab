/*============================================================
  Synavera Project: Trivy Installer
  Module: trivy_installer::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise installer error types so every fatal condition
    reaches a single exit handler with consistent diagnostics.

  Security / Safety Notes:
    Error contexts carry command lines and stderr snippets only;
    no environment or credential data is captured.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate failures and consolidate
    the exit status for the binary entry point.

  Revision History:
    2026-10-16 COD  Established installer error taxonomy.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for installer operations.
pub type Result<T> = std::result::Result<T, InstallerError>;

/// Enumerates the fatal conditions surfaced by the installer.
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Unsupported OS: {os}")]
    UnsupportedOs { os: String },
    #[error("{} not found. Unsupported Linux distribution.", .path.display())]
    MissingOsRelease { path: PathBuf },
    #[error("Unsupported Linux distribution.")]
    UnsupportedDistribution,
    #[error("Unsupported architecture: {arch}")]
    UnsupportedArchitecture { arch: String },
    #[error("Required command `{command}` not found in PATH")]
    CommandMissing { command: String },
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailure {
        command: String,
        status: i32,
        stderr: String,
    },
    #[error("{binary} installation failed or {binary} is not installed.")]
    VerificationFailed { binary: String },
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl InstallerError {
    /// Every fatal condition terminates with status 1.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(1)
    }

    /// Stable tag used as the log event code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            InstallerError::UnsupportedOs { .. } => "UNSUPPORTED_OS",
            InstallerError::MissingOsRelease { .. } => "OS_RELEASE_MISSING",
            InstallerError::UnsupportedDistribution => "UNSUPPORTED_DISTRO",
            InstallerError::UnsupportedArchitecture { .. } => "UNSUPPORTED_ARCH",
            InstallerError::CommandMissing { .. } => "COMMAND_MISSING",
            InstallerError::CommandFailure { .. } => "COMMAND_FAILED",
            InstallerError::VerificationFailed { .. } => "VERIFY_FAILED",
            InstallerError::Config(_) => "CONFIG",
            InstallerError::Filesystem(_) => "FILESYSTEM",
            InstallerError::Runtime(_) => "RUNTIME",
            InstallerError::Io(_) => "IO",
        }
    }
}
