//! Transient test launcher script
//!
//! The launcher glues unittest discovery to the xUnit reporter. It exists on
//! disk only while the test run is in progress: `LauncherScript` removes it
//! on `release` and, failing that, when dropped.

use crate::config::Config;
use crate::error::{BootenvError, BootenvResult};
use crate::layout::ProjectLayout;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Scoped handle to the launcher file
#[derive(Debug)]
pub struct LauncherScript {
    path: PathBuf,
    released: bool,
}

impl LauncherScript {
    /// Write the launcher, replacing any leftover from an interrupted run
    pub async fn acquire(path: &Path, contents: &str) -> BootenvResult<Self> {
        fs::write(path, contents)
            .await
            .map_err(|e| BootenvError::io(format!("writing launcher {}", path.display()), e))?;
        debug!("Wrote launcher {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the launcher, reporting failures
    pub async fn release(mut self) -> BootenvResult<()> {
        self.released = true;
        match fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(BootenvError::io(
                format!("removing launcher {}", self.path.display()),
                e,
            )),
            _ => Ok(()),
        }
    }
}

impl Drop for LauncherScript {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                warn!("Failed to remove launcher {}: {}", self.path.display(), e);
            }
            _ => {}
        }
    }
}

/// Quote a path as a Python string literal.
///
/// Non-ASCII characters are emitted as UTF-8, which the source encoding
/// declaration in the rendered header covers.
fn py_str(path: &Path) -> String {
    serde_json::to_string(&path.to_string_lossy()).unwrap_or_else(|_| "''".to_string())
}

/// Python source of the launcher for this project
pub fn render(layout: &ProjectLayout, config: &Config) -> String {
    let tests = &config.tests;
    let start = layout.root.join(&tests.start_dir);
    let top = tests
        .top_level_dir
        .as_ref()
        .map(|dir| layout.root.join(dir))
        .unwrap_or_else(|| layout.root.clone());
    let report = layout.xunit_dir.join(&tests.report_name);

    format!(
        r#"# -*- coding: utf-8 -*-
# Generated by bootenv for a single test run.
import sys
import unittest

import xmlrunner

suite = unittest.TestLoader().discover({start}, pattern={pattern}, top_level_dir={top})
with open({report}, 'wb') as output:
    result = xmlrunner.XMLTestRunner(output=output, verbosity=2).run(suite)
sys.exit(0 if result.wasSuccessful() else 1)
"#,
        start = py_str(&start),
        pattern = py_str(Path::new(&tests.pattern)),
        top = py_str(&top),
        report = py_str(&report),
    )
}
