/*============================================================
  Synavera Project: Trivy Installer
  Module: trivy_installer::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for the Trivy installer. Checks for an existing
    Trivy binary, installs the requested release from the
    matching native package when absent, and verifies the
    result.

  Security / Safety Notes:
    Executes curl, the target binary, and the distribution
    package manager under sudo. Performs one HTTPS download.

  Dependencies:
    clap for CLI parsing, chrono for session stamps, tokio for
    the single-threaded runtime.

  Operational Scope:
    Invoked by provisioning scripts and operators on Amazon
    Linux and Ubuntu hosts.

  Revision History:
    2026-10-16 COD  Authored installer runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod artifact;
mod config;
mod error;
mod installer;
mod logger;
mod platform;
mod probe;
mod runner;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use config::InstallerConfig;
use error::Result;
use installer::{announce_platform, InstallPlan};
use logger::Logger;
use platform::{HostProbe, SystemHost};
use probe::{detect_installed, verify_installation};
use runner::{CommandRunner, SystemRunner};

/// Command-line arguments for the Trivy installer.
#[derive(Debug, Parser)]
#[command(
    name = "trivy-installer",
    version,
    author = "Synavera Systems",
    about = "Install Trivy by specifying the version."
)]
struct Cli {
    /// Trivy version to install (e.g., 0.53.0).
    #[arg(id = "target_version", value_name = "VERSION")]
    version: String,
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH", conflicts_with = "no_log_file")]
    log: Option<PathBuf>,
    /// Do not write a session log file.
    #[arg(long, action = ArgAction::SetTrue)]
    no_log_file: bool,
    /// Resolve the platform and print the planned commands without running them.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

/// How a run concluded.
#[derive(Debug)]
enum Outcome {
    /// The binary was already present and still answers its version probe.
    AlreadyInstalled { version: String },
    /// The package was installed and verified.
    Installed { version: String },
    /// Dry run: nothing executed.
    Planned(Box<InstallPlan>),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[trivy-installer] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = InstallerConfig::load_from_optional_path(cli.config.as_deref())?;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = if cli.no_log_file {
        None
    } else {
        cli.log.clone().or_else(|| {
            config
                .log_dir()
                .map(|dir| dir.join(format!("install_{session_stamp}.log")))
        })
    };
    let logger = Logger::new(log_path, cli.verbose)?;
    logger.info(
        "INIT",
        format!("Requested {} {}", config.binary, cli.version),
    );

    let outcome = provision(
        &cli.version,
        cli.dry_run,
        &config,
        &SystemHost,
        &SystemRunner,
        &logger,
    )
    .await;

    let code = match outcome {
        Ok(Outcome::AlreadyInstalled { version }) => {
            logger.info("COMPLETE", format!("Existing install {version} kept"));
            ExitCode::SUCCESS
        }
        Ok(Outcome::Installed { version }) => {
            logger.info("COMPLETE", format!("Installed {version}"));
            ExitCode::SUCCESS
        }
        Ok(Outcome::Planned(plan)) => {
            print_plan(&plan);
            logger.info("COMPLETE", "Dry run finished; nothing executed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            logger.error(err.code(), err.to_string());
            err.exit_code()
        }
    };
    logger.finalize()?;

    Ok(code)
}

/// Detect, install when absent, then verify.
async fn provision(
    version: &str,
    dry_run: bool,
    config: &InstallerConfig,
    host: &dyn HostProbe,
    runner: &dyn CommandRunner,
    logger: &Logger,
) -> Result<Outcome> {
    let existing = detect_installed(runner, &config.binary, logger).await;

    if dry_run {
        if let Some(version) = existing {
            return Ok(Outcome::AlreadyInstalled { version });
        }
        let plan = InstallPlan::resolve(version, config, host, config.escalation.prefix())?;
        announce_platform(&plan, logger);
        return Ok(Outcome::Planned(Box::new(plan)));
    }

    if existing.is_none() {
        installer::install(version, config, host, runner, logger).await?;
    }

    let verified = verify_installation(runner, &config.binary, logger).await?;
    Ok(match existing {
        Some(_) => Outcome::AlreadyInstalled { version: verified },
        None => Outcome::Installed { version: verified },
    })
}

fn print_plan(plan: &InstallPlan) {
    println!(
        "→ Dry run. Artifact={} Directory={}",
        plan.artifact.file_name,
        plan.download_dir.display()
    );
    println!("  download: {}", plan.download);
    println!("  install:  {}", plan.install);
}
