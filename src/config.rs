/*============================================================
  Synavera Project: Trivy Installer
  Module: trivy_installer::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load optional operator configuration that tunes where the
    release lives, where artifacts land, and how privileged
    commands are escalated.

  Security / Safety Notes:
    Configuration is read-only and parsed strictly; unknown
    keys are rejected so typos never silently change behaviour.

  Dependencies:
    serde + toml for parsing, dirs for default locations,
    libc for effective-uid detection.

  Operational Scope:
    Resolved once at startup and shared by the detector,
    installer and verifier stages.

  Revision History:
    2026-10-16 COD  Introduced installer configuration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Sensible defaults with explicit overrides
    - Strict parsing with actionable diagnostics
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{InstallerError, Result};

const APP_DIR: &str = "trivy_installer";
const DEFAULT_BINARY: &str = "trivy";
const DEFAULT_RELEASE_BASE_URL: &str = "https://github.com/aquasecurity/trivy/releases/download";
const DEFAULT_OS_RELEASE_PATH: &str = "/etc/os-release";

/// How package-manager commands acquire root privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escalation {
    /// Always prefix with `sudo`.
    #[default]
    Sudo,
    /// Run the package manager directly.
    #[serde(rename = "none")]
    Direct,
    /// Prefix with `sudo` unless the effective uid is already root.
    Auto,
}

impl Escalation {
    /// Program prefix required for privileged commands, if any.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Escalation::Sudo => Some("sudo"),
            Escalation::Direct => None,
            Escalation::Auto => {
                // SAFETY: geteuid has no preconditions and cannot fail.
                if unsafe { libc::geteuid() } == 0 {
                    None
                } else {
                    Some("sudo")
                }
            }
        }
    }
}

/// Resolved installer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Binary probed for its version; also the artifact name prefix.
    pub binary: String,
    /// Release download root, without trailing tag or artifact.
    pub release_base_url: String,
    /// Distribution identifier file.
    pub os_release_path: PathBuf,
    /// Where artifacts are downloaded; current directory when unset.
    pub download_dir: Option<PathBuf>,
    pub escalation: Escalation,
    pub log_dir: Option<PathBuf>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            release_base_url: DEFAULT_RELEASE_BASE_URL.to_string(),
            os_release_path: PathBuf::from(DEFAULT_OS_RELEASE_PATH),
            download_dir: None,
            escalation: Escalation::default(),
            log_dir: None,
        }
    }
}

impl InstallerConfig {
    /// Load configuration from an explicit path, or from the default
    /// location when it exists, falling back to built-in defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(InstallerError::Config(format!(
                        "Configuration file {} does not exist",
                        explicit.display()
                    )));
                }
                Self::load(explicit)
            }
            None => match default_config_path() {
                Some(candidate) if candidate.is_file() => Self::load(&candidate),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            InstallerError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::parse(&raw).map_err(|err| match err {
            InstallerError::Config(detail) => {
                InstallerError::Config(format!("{}: {detail}", path.display()))
            }
            other => other,
        })
    }

    fn parse(raw: &str) -> Result<Self> {
        let config: InstallerConfig =
            toml::from_str(raw).map_err(|err| InstallerError::Config(err.to_string()))?;
        if config.binary.trim().is_empty() {
            return Err(InstallerError::Config("`binary` must not be empty".into()));
        }
        Ok(config)
    }

    /// Directory receiving the downloaded artifact.
    pub fn download_dir(&self) -> Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(|err| {
                InstallerError::Filesystem(format!(
                    "Failed to resolve current directory: {err}"
                ))
            }),
        }
    }

    /// Directory for session logs, if one can be determined.
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log_dir.clone().or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .map(|base| base.join(APP_DIR).join("logs"))
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_upstream_release() {
        let config = InstallerConfig::default();
        assert_eq!(config.binary, "trivy");
        assert_eq!(
            config.release_base_url,
            "https://github.com/aquasecurity/trivy/releases/download"
        );
        assert_eq!(config.os_release_path, PathBuf::from("/etc/os-release"));
        assert_eq!(config.escalation, Escalation::Sudo);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = InstallerConfig::parse(
            r#"
download_dir = "/var/tmp/pkgs"
escalation = "none"
"#,
        )
        .unwrap();
        assert_eq!(config.download_dir, Some(PathBuf::from("/var/tmp/pkgs")));
        assert_eq!(config.escalation, Escalation::Direct);
        assert_eq!(config.binary, "trivy");
        assert_eq!(config.download_dir().unwrap(), PathBuf::from("/var/tmp/pkgs"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = InstallerConfig::parse("checksum = true").unwrap_err();
        assert!(matches!(err, InstallerError::Config(_)));
    }

    #[test]
    fn empty_binary_is_rejected() {
        let err = InstallerConfig::parse(r#"binary = " ""#).unwrap_err();
        assert!(err.to_string().contains("binary"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = InstallerConfig::load_from_optional_path(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "release_base_url = \"https://mirror.internal/trivy\"\nlog_dir = \"/tmp/trivy-logs\"\n",
        )
        .unwrap();
        let config = InstallerConfig::load_from_optional_path(Some(&path)).unwrap();
        assert_eq!(config.release_base_url, "https://mirror.internal/trivy");
        assert_eq!(config.log_dir(), Some(PathBuf::from("/tmp/trivy-logs")));
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "binary = [").unwrap();
        let err = InstallerConfig::load_from_optional_path(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn explicit_escalation_prefixes() {
        assert_eq!(Escalation::Sudo.prefix(), Some("sudo"));
        assert_eq!(Escalation::Direct.prefix(), None);
    }

    #[test]
    fn auto_escalation_follows_effective_uid() {
        // SAFETY: geteuid has no preconditions and cannot fail.
        let is_root = unsafe { libc::geteuid() } == 0;
        let expected = if is_root { None } else { Some("sudo") };
        assert_eq!(Escalation::Auto.prefix(), expected);
    }

    #[test]
    fn auto_escalation_parses() {
        let config = InstallerConfig::parse(r#"escalation = "auto""#).unwrap();
        assert_eq!(config.escalation, Escalation::Auto);
    }
}
