//! Isolated environment provisioning
//!
//! # Pipeline
//!
//! 1. discover requirement manifests (none is fatal)
//! 2. compare the manifest set and input times against the stamp marker;
//!    stop here if current
//! 3. remove the package root
//! 4. fetch (once) and extract the bootstrap archive
//! 5. create the package root
//! 6. install every manifest in order
//! 7. write the stamp
//!
//! The stamp is only written after every step succeeds, so an interrupted
//! or failed run is always rebuilt from clean next time.

pub mod bootstrap;
pub mod installer;
pub mod stamp;

pub use bootstrap::{Fetcher, HttpFetcher};
pub use installer::{discover_manifests, Manifest};
pub use stamp::{Freshness, ManifestDigest, StampRecord};

use crate::config::Config;
use crate::error::{BootenvError, BootenvResult};
use crate::layout::ProjectLayout;
use crate::process::ToolRunner;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Result of `Provisioner::ensure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Nothing to do
    UpToDate,
    /// Package root rebuilt because of the given freshness
    Rebuilt(Freshness),
}

/// Snapshot of the environment state, without side effects
#[derive(Debug, Clone)]
pub struct ProvisionStatus {
    pub manifests: Vec<Manifest>,
    pub freshness: Freshness,
    pub record: Option<StampRecord>,
}

/// Builds and validates the package root
pub struct Provisioner<'a> {
    config: &'a Config,
    layout: &'a ProjectLayout,
    runner: &'a dyn ToolRunner,
    fetcher: &'a dyn Fetcher,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        config: &'a Config,
        layout: &'a ProjectLayout,
        runner: &'a dyn ToolRunner,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        Self {
            config,
            layout,
            runner,
            fetcher,
        }
    }

    /// Discover manifests, failing when there are none
    pub fn manifests(&self) -> BootenvResult<Vec<Manifest>> {
        let manifests =
            discover_manifests(&self.layout.manifest_dir, &self.config.requirements.pattern)?;
        if manifests.is_empty() {
            return Err(BootenvError::NoManifests {
                dir: self.layout.manifest_dir.clone(),
                pattern: self.config.requirements.pattern.clone(),
            });
        }
        Ok(manifests)
    }

    /// Current freshness for a set of manifests
    pub async fn freshness(&self, manifests: &[Manifest]) -> (Freshness, Option<StampRecord>) {
        let record = StampRecord::read(&self.layout.stamp).await;

        let Some(ref recorded) = record else {
            return (Freshness::Missing, None);
        };

        if recorded.bootstrap_version != self.config.bootstrap.version {
            let freshness = Freshness::VersionChanged {
                recorded: recorded.bootstrap_version.clone(),
                configured: self.config.bootstrap.version.clone(),
            };
            return (freshness, record);
        }

        let current = current_digests(manifests).await;
        let changed = stamp::manifest_changes(&recorded.manifests, &current);
        if !changed.is_empty() {
            return (Freshness::ManifestsChanged { changed }, record);
        }

        // Contents match the record here, so a manifest dated in the future
        // is clock skew rather than an edit.
        let now = SystemTime::now();
        let mut inputs = Vec::with_capacity(manifests.len() + 1);
        for manifest in manifests {
            let modified = stamp::modified(&manifest.path);
            if modified.is_some_and(|m| m > now) {
                warn!(
                    "{} is dated in the future; comparing by content only",
                    manifest.path.display()
                );
                continue;
            }
            inputs.push((manifest.path.clone(), modified));
        }

        let archive = self.layout.archive_path(self.config);
        let modified = stamp::modified(&archive);
        if modified.is_some_and(|m| m > now) {
            warn!("{} is dated in the future", archive.display());
        }
        inputs.push((archive, modified));

        let freshness = Freshness::evaluate(stamp::modified(&self.layout.stamp), &inputs);
        (freshness, record)
    }

    /// Report environment state without changing anything
    pub async fn status(&self) -> BootenvResult<ProvisionStatus> {
        let manifests =
            discover_manifests(&self.layout.manifest_dir, &self.config.requirements.pattern)?;
        let (freshness, record) = self.freshness(&manifests).await;
        Ok(ProvisionStatus {
            manifests,
            freshness,
            record,
        })
    }

    /// Ensure the package root exists and is current
    pub async fn ensure(&self) -> BootenvResult<ProvisionOutcome> {
        let manifests = self.manifests()?;
        let (freshness, _) = self.freshness(&manifests).await;

        if freshness.is_current() {
            debug!(
                "Environment at {} is up to date",
                self.layout.package_root.display()
            );
            return Ok(ProvisionOutcome::UpToDate);
        }

        info!("Provisioning {} ({})", self.layout.package_root.display(), freshness);
        self.rebuild(&manifests).await?;
        Ok(ProvisionOutcome::Rebuilt(freshness))
    }

    async fn rebuild(&self, manifests: &[Manifest]) -> BootenvResult<()> {
        remove_dir(&self.layout.package_root).await?;

        let archive = bootstrap::ensure_archive(self.fetcher, self.layout, self.config).await?;
        let script = bootstrap::extract(self.layout, self.config, &archive).await?;

        info!("Creating environment with virtualenv {}", self.config.bootstrap.version);
        self.runner
            .run_checked(&bootstrap::create_invocation(self.layout, self.config, &script))
            .await?;

        installer::install_all(self.runner, self.layout, self.config, manifests).await?;

        let mut digests = Vec::with_capacity(manifests.len());
        for manifest in manifests {
            digests.push(manifest.digest().await?);
        }
        tokio::fs::create_dir_all(&self.layout.package_root)
            .await
            .map_err(|e| {
                BootenvError::io(
                    format!("creating directory {}", self.layout.package_root.display()),
                    e,
                )
            })?;
        StampRecord::new(&self.config.bootstrap.version, digests)
            .write(&self.layout.stamp)
            .await?;

        info!("Environment ready");
        Ok(())
    }
}

/// Digests of the manifests as they are now. An unreadable manifest gets an
/// empty digest, which never matches a recorded one.
async fn current_digests(manifests: &[Manifest]) -> Vec<ManifestDigest> {
    let mut digests = Vec::with_capacity(manifests.len());
    for manifest in manifests {
        let digest = match manifest.digest().await {
            Ok(digest) => digest,
            Err(e) => {
                debug!("{}", e);
                ManifestDigest {
                    name: manifest.name.clone(),
                    sha256: String::new(),
                }
            }
        };
        digests.push(digest);
    }
    digests
}

/// Remove a directory tree; an absent directory is fine
pub async fn remove_dir(path: &Path) -> BootenvResult<bool> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BootenvError::io(format!("removing {}", path.display()), e)),
    }
}
