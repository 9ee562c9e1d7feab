/*============================================================
  Synavera Project: Trivy Installer
  Module: trivy_installer::artifact
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Describe the release artifact matching a requested version
    and platform: its file name and download URL.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module. The
    requested version is used verbatim.

  Dependencies:
    None beyond std.

  Operational Scope:
    Built by the installer after platform resolution and shared
    by the download, install and cleanup steps.

  Revision History:
    2026-10-16 COD  Introduced release artifact descriptor.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Deterministic naming for reproducible downloads
============================================================*/

use std::path::{Path, PathBuf};

use crate::platform::Platform;

/// A release package published for one version and platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArtifact {
    pub file_name: String,
    pub url: String,
}

impl ReleaseArtifact {
    /// `<base>/v<version>/<binary>_<version>_Linux-<label>.<ext>`
    pub fn new(binary: &str, base_url: &str, version: &str, platform: &Platform) -> Self {
        let file_name = format!(
            "{binary}_{version}_Linux-{}.{}",
            platform.architecture.label(),
            platform.format.extension()
        );
        let url = format!(
            "{}/v{version}/{file_name}",
            base_url.trim_end_matches('/')
        );
        Self { file_name, url }
    }

    /// Location of the artifact once downloaded into `dir`.
    pub fn local_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }
}
