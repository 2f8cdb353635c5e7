//! Stamp marker and environment freshness
//!
//! The stamp is the last file written by a successful provision. It records
//! the manifests that were installed, and its modification time is compared
//! against every input. Both must agree before the package root is reused.

use crate::error::{BootenvError, BootenvResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

/// Whether the package root can be used as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// No (readable) stamp: never provisioned, or interrupted
    Missing,
    /// Inputs missing or newer than the stamp
    Stale { newer: Vec<PathBuf> },
    /// Provisioned with a different bootstrap version
    VersionChanged { recorded: String, configured: String },
    /// Manifests added, removed or edited since provisioning
    ManifestsChanged { changed: Vec<String> },
    /// Stamp postdates every input
    Current,
}

impl Freshness {
    /// Compare the stamp time against input modification times.
    ///
    /// An input whose time is `None` does not exist yet and makes the
    /// environment stale. Equal times count as current.
    pub fn evaluate(stamp: Option<SystemTime>, inputs: &[(PathBuf, Option<SystemTime>)]) -> Self {
        let Some(stamp) = stamp else {
            return Self::Missing;
        };

        let newer: Vec<PathBuf> = inputs
            .iter()
            .filter(|(_, modified)| modified.map_or(true, |m| m > stamp))
            .map(|(path, _)| path.clone())
            .collect();

        if newer.is_empty() {
            Self::Current
        } else {
            Self::Stale { newer }
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current)
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "not provisioned"),
            Self::Stale { newer } => write!(f, "stale ({} input(s) changed)", newer.len()),
            Self::VersionChanged {
                recorded,
                configured,
            } => write!(f, "bootstrap version changed ({} -> {})", recorded, configured),
            Self::ManifestsChanged { changed } => {
                write!(f, "manifests changed ({})", changed.join(", "))
            }
            Self::Current => write!(f, "up to date"),
        }
    }
}

/// Modification time of a path, `None` if it does not exist
pub fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// A manifest as it was when the environment was provisioned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDigest {
    /// Manifest file name
    pub name: String,
    /// SHA-256 of the manifest contents (hex)
    pub sha256: String,
}

/// Names of manifests that were added, removed or edited, sorted
pub fn manifest_changes(recorded: &[ManifestDigest], current: &[ManifestDigest]) -> Vec<String> {
    let added_or_edited = current.iter().filter(|digest| !recorded.contains(digest));
    let removed = recorded
        .iter()
        .filter(|old| !current.iter().any(|digest| digest.name == old.name));

    let mut changed: Vec<String> = added_or_edited
        .chain(removed)
        .map(|digest| digest.name.clone())
        .collect();
    changed.sort();
    changed.dedup();
    changed
}

/// Contents of the stamp marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampRecord {
    /// Bootstrap tool version used
    pub bootstrap_version: String,
    /// Manifests installed, in install order
    pub manifests: Vec<ManifestDigest>,
    /// When provisioning completed
    pub provisioned_at: DateTime<Utc>,
}

impl StampRecord {
    pub fn new(bootstrap_version: impl Into<String>, manifests: Vec<ManifestDigest>) -> Self {
        Self {
            bootstrap_version: bootstrap_version.into(),
            manifests,
            provisioned_at: Utc::now(),
        }
    }

    /// Read a stamp; absent or unreadable stamps yield `None`
    pub async fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Ignoring unreadable stamp {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the stamp via a temp file and rename
    pub async fn write(&self, path: &Path) -> BootenvResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");

        fs::write(&tmp, content)
            .await
            .map_err(|e| BootenvError::io(format!("writing stamp {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| BootenvError::io(format!("writing stamp {}", path.display()), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn at(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn missing_stamp() {
        let inputs = vec![(PathBuf::from("requirements.txt"), at(10))];
        assert_eq!(Freshness::evaluate(None, &inputs), Freshness::Missing);
    }

    #[test]
    fn current_when_stamp_newest() {
        let inputs = vec![
            (PathBuf::from("requirements.txt"), at(10)),
            (PathBuf::from("virtualenv.tar.gz"), at(5)),
        ];
        assert!(Freshness::evaluate(at(20), &inputs).is_current());
    }

    #[test]
    fn equal_times_are_current() {
        let inputs = vec![(PathBuf::from("requirements.txt"), at(20))];
        assert!(Freshness::evaluate(at(20), &inputs).is_current());
    }

    #[test]
    fn newer_manifest_is_stale() {
        let inputs = vec![
            (PathBuf::from("requirements.txt"), at(10)),
            (PathBuf::from("requirements-dev.txt"), at(30)),
        ];
        assert_eq!(
            Freshness::evaluate(at(20), &inputs),
            Freshness::Stale {
                newer: vec![PathBuf::from("requirements-dev.txt")]
            }
        );
    }

    #[test]
    fn absent_input_is_stale() {
        let inputs = vec![(PathBuf::from("virtualenv.tar.gz"), None)];
        assert!(matches!(
            Freshness::evaluate(at(20), &inputs),
            Freshness::Stale { .. }
        ));
    }

    fn digest(name: &str, sha: &str) -> ManifestDigest {
        ManifestDigest {
            name: name.to_string(),
            sha256: sha.to_string(),
        }
    }

    #[test]
    fn identical_manifest_sets_have_no_changes() {
        let set = vec![digest("requirements.txt", "aa"), digest("requirements-dev.txt", "bb")];
        assert!(manifest_changes(&set, &set).is_empty());
    }

    #[test]
    fn manifest_changes_cover_added_removed_and_edited() {
        let recorded = vec![
            digest("requirements-dev.txt", "aa"),
            digest("requirements-old.txt", "bb"),
            digest("requirements.txt", "cc"),
        ];
        let current = vec![
            digest("requirements-dev.txt", "aa"),
            digest("requirements-extra.txt", "dd"),
            digest("requirements.txt", "ee"),
        ];

        assert_eq!(
            manifest_changes(&recorded, &current),
            ["requirements-extra.txt", "requirements-old.txt", "requirements.txt"]
        );
    }

    #[tokio::test]
    async fn record_survives_write_and_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".stamp");
        let record = StampRecord::new(
            "1.7",
            vec![ManifestDigest {
                name: "requirements.txt".to_string(),
                sha256: "ab".repeat(32),
            }],
        );

        record.write(&path).await.unwrap();
        let loaded = StampRecord::read(&path).await.unwrap();

        assert_eq!(loaded.bootstrap_version, "1.7");
        assert_eq!(loaded.manifests, record.manifests);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn garbage_stamp_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".stamp");
        std::fs::write(&path, "").unwrap();
        assert!(StampRecord::read(&path).await.is_none());
    }
}
