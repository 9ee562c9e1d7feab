/*============================================================
  Synavera Project: Trivy Installer
  Module: trivy_installer::platform
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Resolve the host platform: kernel family, Linux distribution
    and CPU architecture, and map them to the package flavour
    published for each supported combination.

  Security / Safety Notes:
    Reads the distribution identifier file and queries uname(2);
    no privileged calls are made.

  Dependencies:
    libc for uname(2).

  Operational Scope:
    Consulted once per installation attempt, before any network
    or package-manager activity.

  Revision History:
    2026-10-16 COD  Authored platform resolution.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit enumerations instead of implicit fallthrough
    - Fail fast before side effects
============================================================*/

use std::fmt;
use std::path::Path;

use crate::error::{InstallerError, Result};

/// Distribution markers checked in order; the first match wins.
const DISTRIBUTION_MARKERS: [(&str, Distribution); 2] = [
    ("amazon linux", Distribution::AmazonLinux),
    ("ubuntu", Distribution::Ubuntu),
];

const RPM_INSTALL_ARGS: &[&str] = &["-ivh"];
const DEB_INSTALL_ARGS: &[&str] = &["-i"];

/// Host facts the installer needs, abstracted for testing.
pub trait HostProbe {
    /// Kernel family as reported by the host (e.g. `Linux`).
    fn os_name(&self) -> Result<String>;
    /// Raw machine hardware name (e.g. `x86_64`, `aarch64`).
    fn machine(&self) -> Result<String>;
}

/// Linux distribution families recognised from os-release content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    AmazonLinux,
    Ubuntu,
    Unknown,
}

impl Distribution {
    /// Package flavour published for this distribution, if supported.
    pub fn package_format(self) -> Option<PackageFormat> {
        match self {
            Distribution::AmazonLinux => Some(PackageFormat::Rpm),
            Distribution::Ubuntu => Some(PackageFormat::Deb),
            Distribution::Unknown => None,
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Distribution::AmazonLinux => "Amazon Linux",
            Distribution::Ubuntu => "Ubuntu",
            Distribution::Unknown => "Unknown",
        })
    }
}

/// Classify os-release content; matching is case-insensitive substring search.
pub fn classify_distribution(os_release: &str) -> Distribution {
    let haystack = os_release.to_lowercase();
    DISTRIBUTION_MARKERS
        .iter()
        .find(|(marker, _)| haystack.contains(marker))
        .map(|(_, distribution)| *distribution)
        .unwrap_or(Distribution::Unknown)
}

/// Supported CPU architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    X86_64,
    Aarch64,
}

impl Architecture {
    pub fn from_machine(machine: &str) -> Option<Self> {
        match machine {
            "x86_64" => Some(Architecture::X86_64),
            "aarch64" => Some(Architecture::Aarch64),
            _ => None,
        }
    }

    /// Token used in release artifact names.
    pub fn label(self) -> &'static str {
        match self {
            Architecture::X86_64 => "64bit",
            Architecture::Aarch64 => "ARM64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Architecture::X86_64 => "x86_64",
            Architecture::Aarch64 => "aarch64",
        })
    }
}

/// Native package formats and their installers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    Rpm,
    Deb,
}

impl PackageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PackageFormat::Rpm => "rpm",
            PackageFormat::Deb => "deb",
        }
    }

    /// Package manager program and the arguments preceding the package path.
    pub fn install_command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            PackageFormat::Rpm => ("rpm", RPM_INSTALL_ARGS),
            PackageFormat::Deb => ("dpkg", DEB_INSTALL_ARGS),
        }
    }
}

/// A supported host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub distribution: Distribution,
    pub architecture: Architecture,
    pub format: PackageFormat,
}

/// Resolve the host platform, failing on anything outside the supported matrix.
pub fn detect_platform(host: &dyn HostProbe, os_release_path: &Path) -> Result<Platform> {
    let os = host.os_name()?.to_lowercase();
    if os != "linux" {
        return Err(InstallerError::UnsupportedOs { os });
    }

    if !os_release_path.exists() {
        return Err(InstallerError::MissingOsRelease {
            path: os_release_path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(os_release_path).map_err(|err| {
        InstallerError::Filesystem(format!(
            "Failed to read {}: {err}",
            os_release_path.display()
        ))
    })?;
    let distribution = classify_distribution(&contents);
    let format = distribution
        .package_format()
        .ok_or(InstallerError::UnsupportedDistribution)?;

    let machine = host.machine()?;
    let architecture = Architecture::from_machine(&machine)
        .ok_or(InstallerError::UnsupportedArchitecture { arch: machine })?;

    Ok(Platform {
        distribution,
        architecture,
        format,
    })
}

/// Host probe backed by uname(2).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl HostProbe for SystemHost {
    fn os_name(&self) -> Result<String> {
        uname().map(|(sysname, _)| sysname)
    }

    fn machine(&self) -> Result<String> {
        uname().map(|(_, machine)| machine)
    }
}

#[cfg(unix)]
fn uname() -> Result<(String, String)> {
    use std::ffi::CStr;

    // SAFETY: utsname is plain C data of fixed-size char arrays; all-zero is valid.
    let mut info: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: `info` is a valid, writable utsname for the duration of the call.
    if unsafe { libc::uname(&mut info) } != 0 {
        return Err(InstallerError::Runtime(format!(
            "uname failed: {}",
            std::io::Error::last_os_error()
        )));
    }
    // SAFETY: uname succeeded, so both fields hold NUL-terminated strings
    // that live as long as `info`.
    let sysname = unsafe { CStr::from_ptr(info.sysname.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    let machine = unsafe { CStr::from_ptr(info.machine.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    Ok((sysname, machine))
}

#[cfg(not(unix))]
fn uname() -> Result<(String, String)> {
    Ok((
        std::env::consts::OS.to_string(),
        std::env::consts::ARCH.to_string(),
    ))
}
