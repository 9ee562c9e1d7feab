/*============================================================
  Synavera Project: Trivy Installer
  Module: trivy_installer::probe
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Ask the target binary for its version, both to short-circuit
    installs on hosts that already carry it and to confirm a
    fresh install is runnable.

  Security / Safety Notes:
    Runs the target binary with `--version` only, under the
    caller's privileges.

  Dependencies:
    crate::runner for command execution.

  Operational Scope:
    First and last stage of every installer run.

  Revision History:
    2026-10-16 COD  Authored version probe and verifier.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Negative probe results are data, not failures
    - Structured parsing with clear failure modes
============================================================*/

use crate::error::{InstallerError, Result};
use crate::logger::Logger;
use crate::runner::{CommandRunner, Invocation};

const VERSION_FLAG: &str = "--version";

/// Extract the version from `--version` output.
///
/// Handles both `Version: 0.53.0` and `trivy version 0.53.0`: the token
/// following a leading `version` keyword wins, otherwise the second
/// whitespace-separated token is taken. One leading `v` is removed.
pub fn parse_version_output(stdout: &str) -> Option<String> {
    let tokens: Vec<&str> = stdout.split_whitespace().collect();
    let keyword = tokens
        .iter()
        .take(2)
        .position(|token| token.trim_end_matches(':').eq_ignore_ascii_case("version"));
    let token = match keyword {
        Some(idx) => *tokens.get(idx + 1)?,
        None => *tokens.get(1)?,
    };
    let version = token.strip_prefix('v').unwrap_or(token);
    Some(version.to_string())
}

/// Probe the binary; `None` means it is missing, failing, or unparseable.
///
/// A binary that cannot be launched and one that exits non-zero are
/// reported identically.
pub async fn probe_version(
    runner: &dyn CommandRunner,
    binary: &str,
    logger: &Logger,
) -> Option<String> {
    let invocation = Invocation::new(binary).arg(VERSION_FLAG);
    match runner.run(&invocation).await {
        Ok(output) if output.success() => {
            let parsed = parse_version_output(&output.stdout);
            if parsed.is_none() {
                logger.warn(
                    "PROBE",
                    format!("Unrecognised `{invocation}` output: {}", output.stdout.trim()),
                );
            }
            parsed
        }
        Ok(output) => {
            logger.debug(
                "PROBE",
                format!("`{invocation}` exited with status {}", output.status),
            );
            None
        }
        Err(err) => {
            logger.debug("PROBE", format!("`{invocation}` unavailable: {err}"));
            None
        }
    }
}

/// Report whether the binary is already installed, printing the outcome.
pub async fn detect_installed(
    runner: &dyn CommandRunner,
    binary: &str,
    logger: &Logger,
) -> Option<String> {
    let display = display_name(binary);
    match probe_version(runner, binary, logger).await {
        Some(version) => {
            println!(
                "{display} is already installed (version: {version}). Skipping installation."
            );
            logger.info("DETECT", format!("{binary} {version} already present"));
            Some(version)
        }
        None => {
            println!("{display} is not installed.");
            logger.info("DETECT", format!("{binary} not present"));
            None
        }
    }
}

/// Confirm the binary runs after installation.
///
/// The reported version is not compared with the requested one.
pub async fn verify_installation(
    runner: &dyn CommandRunner,
    binary: &str,
    logger: &Logger,
) -> Result<String> {
    let version = probe_version(runner, binary, logger)
        .await
        .ok_or_else(|| InstallerError::VerificationFailed {
            binary: display_name(binary),
        })?;
    println!(
        "{} installed successfully. Version: {version}",
        display_name(binary)
    );
    logger.info("VERIFY", format!("{binary} {version} verified"));
    Ok(version)
}

/// `trivy` → `Trivy`, for operator-facing messages.
pub fn display_name(binary: &str) -> String {
    let mut chars = binary.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    #[test]
    fn parses_both_output_shapes() {
        assert_eq!(
            parse_version_output("trivy version 0.53.0\n").as_deref(),
            Some("0.53.0")
        );
        assert_eq!(
            parse_version_output("Version: 0.53.0\nVulnerability DB:\n  Version: 2\n").as_deref(),
            Some("0.53.0")
        );
    }

    #[test]
    fn falls_back_to_second_token() {
        assert_eq!(parse_version_output("trivy v0.41.2").as_deref(), Some("0.41.2"));
    }

    #[test]
    fn strips_single_leading_v() {
        assert_eq!(parse_version_output("Version: v0.53.0").as_deref(), Some("0.53.0"));
        assert_eq!(parse_version_output("Version: vv1").as_deref(), Some("v1"));
    }

    #[test]
    fn short_output_is_unparseable() {
        assert_eq!(parse_version_output(""), None);
        assert_eq!(parse_version_output("trivy"), None);
        assert_eq!(parse_version_output("Version:"), None);
    }

    #[tokio::test]
    async fn installed_binary_reports_version() {
        let runner = FakeRunner::new().respond("trivy", 0, "trivy version v0.53.0\n", "");
        let logger = Logger::new(None, false).unwrap();
        let version = detect_installed(&runner, "trivy", &logger).await;
        assert_eq!(version.as_deref(), Some("0.53.0"));
        assert_eq!(runner.calls()[0].to_string(), "trivy --version");
    }

    #[tokio::test]
    async fn missing_and_failing_binaries_look_the_same() {
        let logger = Logger::new(None, false).unwrap();

        let missing = FakeRunner::new().missing("trivy");
        assert_eq!(detect_installed(&missing, "trivy", &logger).await, None);

        let failing = FakeRunner::new().respond("trivy", 127, "", "segfault");
        assert_eq!(detect_installed(&failing, "trivy", &logger).await, None);
    }

    #[tokio::test]
    async fn verification_fails_when_probe_fails() {
        let runner = FakeRunner::new().respond("trivy", 1, "", "not found");
        let logger = Logger::new(None, false).unwrap();
        let err = verify_installation(&runner, "trivy", &logger)
            .await
            .unwrap_err();
        assert!(matches!(err, InstallerError::VerificationFailed { .. }));
        assert_eq!(
            err.to_string(),
            "Trivy installation failed or Trivy is not installed."
        );
    }

    #[tokio::test]
    async fn verification_does_not_compare_versions() {
        let runner = FakeRunner::new().respond("trivy", 0, "Version: 0.49.0\n", "");
        let logger = Logger::new(None, false).unwrap();
        let version = verify_installation(&runner, "trivy", &logger).await.unwrap();
        assert_eq!(version, "0.49.0");
    }

    #[test]
    fn display_name_capitalises() {
        assert_eq!(display_name("trivy"), "Trivy");
        assert_eq!(display_name(""), "");
    }
}
