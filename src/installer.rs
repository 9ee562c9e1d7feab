/*============================================================
  Synavera Project: Trivy Installer
  Module: trivy_installer::installer
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Turn a requested version into a concrete install plan for
    the host, then download the package, hand it to the native
    package manager and remove the downloaded file.

  Security / Safety Notes:
    The package-manager step runs with elevated privileges
    (sudo by default). Downloaded packages are not checksummed.

  Dependencies:
    crate::platform for host resolution, crate::runner for
    command execution.

  Operational Scope:
    Runs only when the version probe finds no existing install.

  Revision History:
    2026-10-16 COD  Authored download and install pipeline.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Resolve everything before the first side effect
    - Deterministic command invocation with explicit checks
    - No silent failure paths
============================================================*/

use std::path::PathBuf;

use crate::artifact::ReleaseArtifact;
use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result};
use crate::logger::Logger;
use crate::platform::{detect_platform, HostProbe, Platform};
use crate::probe::display_name;
use crate::runner::{CommandRunner, Invocation};

/// Everything needed to install one version on this host.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub binary: String,
    pub platform: Platform,
    pub artifact: ReleaseArtifact,
    pub download_dir: PathBuf,
    pub download: Invocation,
    pub install: Invocation,
}

impl InstallPlan {
    /// Resolve the host platform and derive the download and install commands.
    ///
    /// Fails before any command runs when the platform is unsupported.
    pub fn resolve(
        version: &str,
        config: &InstallerConfig,
        host: &dyn HostProbe,
        escalation: Option<&str>,
    ) -> Result<Self> {
        let platform = detect_platform(host, &config.os_release_path)?;
        let artifact =
            ReleaseArtifact::new(&config.binary, &config.release_base_url, version, &platform);
        let download_dir = config.download_dir()?;
        if !download_dir.is_dir() {
            return Err(InstallerError::Filesystem(format!(
                "Download directory {} does not exist",
                download_dir.display()
            )));
        }

        // -f turns HTTP errors into a non-zero exit instead of saving the error page.
        let download = Invocation::new("curl")
            .arg("-fLO")
            .arg(artifact.url.clone())
            .current_dir(&download_dir);

        let (manager, manager_args) = platform.format.install_command();
        let mut install = match escalation {
            Some(prefix) => Invocation::new(prefix).arg(manager),
            None => Invocation::new(manager),
        };
        for arg in manager_args {
            install = install.arg(*arg);
        }
        let install = install
            .arg(artifact.file_name.clone())
            .current_dir(&download_dir);

        Ok(Self {
            binary: config.binary.clone(),
            platform,
            artifact,
            download_dir,
            download,
            install,
        })
    }

    fn package_kind(&self) -> String {
        self.platform.format.extension().to_uppercase()
    }
}

/// Download, install, and remove the artifact described by `plan`.
pub async fn execute(plan: &InstallPlan, runner: &dyn CommandRunner, logger: &Logger) -> Result<()> {
    let display = display_name(&plan.binary);
    let kind = plan.package_kind();

    println!(
        "Downloading {display} {kind} package from {}...",
        plan.artifact.url
    );
    logger.info("DOWNLOAD", plan.download.to_string());
    runner.run_checked(&plan.download).await?;

    println!("Installing {display} {kind} package...");
    logger.info("INSTALL", plan.install.to_string());
    let output = runner.run_checked(&plan.install).await?;
    if !output.stdout.trim().is_empty() {
        logger.debug("INSTALL", output.stdout.trim());
    }

    remove_artifact(plan, logger);
    println!("{display} installation completed.");
    Ok(())
}

/// Detect the platform and install `version` on it.
pub async fn install(
    version: &str,
    config: &InstallerConfig,
    host: &dyn HostProbe,
    runner: &dyn CommandRunner,
    logger: &Logger,
) -> Result<InstallPlan> {
    let plan = InstallPlan::resolve(version, config, host, config.escalation.prefix())?;
    announce_platform(&plan, logger);
    execute(&plan, runner, logger).await?;
    Ok(plan)
}

/// Print the detected distribution and architecture.
pub fn announce_platform(plan: &InstallPlan, logger: &Logger) {
    println!(
        "{} detected, architecture: {}",
        plan.platform.distribution, plan.platform.architecture
    );
    logger.info(
        "PLATFORM",
        format!(
            "distribution={} arch={} label={} format={}",
            plan.platform.distribution,
            plan.platform.architecture,
            plan.platform.architecture.label(),
            plan.platform.format.extension()
        ),
    );
}

// The install already succeeded; a leftover file only earns a warning.
fn remove_artifact(plan: &InstallPlan, logger: &Logger) {
    let path = plan.artifact.local_path(&plan.download_dir);
    match std::fs::remove_file(&path) {
        Ok(()) => logger.debug("CLEANUP", format!("Removed {}", path.display())),
        Err(err) => logger.warn(
            "CLEANUP",
            format!("Failed to remove {}: {err}", path.display()),
        ),
    }
}
