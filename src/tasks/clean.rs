//! Clean family removals
//!
//! Removing something that is already absent is never an error.

use crate::error::{BootenvError, BootenvResult};
use crate::layout::ProjectLayout;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Advisory printed by `maintainer-clean`
pub const MAINTAINER_NOTICE: &str = "This command is intended for maintainers to use; it \
deletes files that may need special tools to rebuild.";

/// Paths removed by `clean`. The durable cache is not among them.
pub fn clean_targets(layout: &ProjectLayout) -> Vec<PathBuf> {
    vec![
        layout.build_dir.clone(),
        layout.report_dir.clone(),
        layout.dist_dir.clone(),
        layout.coverage_data.clone(),
        layout.launcher.clone(),
        layout.package_root.clone(),
    ]
}

/// Paths removed by `distclean` on top of `clean`
pub fn distclean_targets(layout: &ProjectLayout) -> Vec<PathBuf> {
    vec![layout.cache_dir.clone(), layout.local_override.clone()]
}

/// Remove a file or directory tree. Returns whether anything was removed.
async fn remove_path(path: &Path) -> BootenvResult<bool> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(BootenvError::io(format!("inspecting {}", path.display()), e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BootenvError::io(format!("removing {}", path.display()), e)),
    }
}

/// Remove every target, returning the ones that existed
pub async fn remove_all(targets: &[PathBuf]) -> BootenvResult<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for target in targets {
        if remove_path(target).await? {
            removed.push(target.clone());
        }
    }
    Ok(removed)
}
