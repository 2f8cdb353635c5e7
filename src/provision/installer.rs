//! Requirement manifest discovery and installation
//!
//! Manifests are installed in file name order so later manifests can
//! extend or override what earlier ones pinned.

use super::stamp::ManifestDigest;
use crate::config::Config;
use crate::error::{BootenvError, BootenvResult};
use crate::layout::ProjectLayout;
use crate::process::{Invocation, ToolRunner};
use globset::Glob;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A discovered requirement manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// File name, the sort key
    pub name: String,
    /// Full path
    pub path: PathBuf,
}

impl Manifest {
    /// SHA-256 of the manifest contents
    pub async fn digest(&self) -> BootenvResult<ManifestDigest> {
        let contents = tokio::fs::read(&self.path).await.map_err(|e| {
            BootenvError::io(format!("reading manifest {}", self.path.display()), e)
        })?;

        Ok(ManifestDigest {
            name: self.name.clone(),
            sha256: hex::encode(Sha256::digest(&contents)),
        })
    }
}

/// Find manifests in `dir` whose file name matches `pattern`, sorted by name
pub fn discover_manifests(dir: &Path, pattern: &str) -> BootenvResult<Vec<Manifest>> {
    let matcher = Glob::new(pattern)
        .map_err(|e| BootenvError::ManifestPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?
        .compile_matcher();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(BootenvError::io(
                format!("reading manifest directory {}", dir.display()),
                e,
            ))
        }
    };

    let mut manifests = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            BootenvError::io(format!("reading manifest directory {}", dir.display()), e)
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if matcher.is_match(&name) {
            debug!("Found manifest: {}", path.display());
            manifests.push(Manifest { name, path });
        }
    }

    manifests.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(manifests)
}

/// Build the installer invocation for one manifest
pub fn install_invocation(
    layout: &ProjectLayout,
    config: &Config,
    manifest: &Manifest,
) -> Invocation {
    Invocation::new(layout.bin("pip"), &layout.root)
        .arg("install")
        .arg("--cache-dir")
        .arg(&layout.pip_cache)
        .arg("-r")
        .arg(&manifest.path)
        .args(&config.requirements.install_args)
}

/// Install every manifest in order, stopping at the first failure
pub async fn install_all(
    runner: &dyn ToolRunner,
    layout: &ProjectLayout,
    config: &Config,
    manifests: &[Manifest],
) -> BootenvResult<()> {
    tokio::fs::create_dir_all(&layout.pip_cache)
        .await
        .map_err(|e| {
            BootenvError::io(format!("creating directory {}", layout.pip_cache.display()), e)
        })?;

    for manifest in manifests {
        info!("Installing {}", manifest.name);
        runner
            .run_checked(&install_invocation(layout, config, manifest))
            .await?;
    }

    Ok(())
}
