//! Resolved project filesystem layout
//!
//! Every task receives a `ProjectLayout` instead of looking paths up on its
//! own, so the package and cache roots are always explicit.

use crate::config::{Config, ConfigManager};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Stamp marker file name inside the package root
pub const STAMP_FILE: &str = ".stamp";

/// Transient test launcher script name
pub const LAUNCHER_FILE: &str = ".bootenv_launcher.py";

/// Absolute paths for one project
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root all other paths are relative to
    pub root: PathBuf,
    /// Durable cache root
    pub cache_dir: PathBuf,
    /// Cached bootstrap archives and their extracted sources
    pub bootstrap_cache: PathBuf,
    /// Package installer download cache
    pub pip_cache: PathBuf,
    /// Isolated package root
    pub package_root: PathBuf,
    /// Stamp marker
    pub stamp: PathBuf,
    /// Directory searched for requirement manifests
    pub manifest_dir: PathBuf,
    pub build_dir: PathBuf,
    pub report_dir: PathBuf,
    /// xUnit result directory under the report dir
    pub xunit_dir: PathBuf,
    /// Coverage XML report
    pub coverage_xml: PathBuf,
    pub dist_dir: PathBuf,
    /// Coverage data file
    pub coverage_data: PathBuf,
    /// Local config override
    pub local_override: PathBuf,
    /// Transient test launcher script
    pub launcher: PathBuf,
}

impl ProjectLayout {
    /// Resolve the layout of `root` from configuration
    pub fn resolve(root: &Path, config: &Config) -> Self {
        let layout = &config.layout;
        let cache_dir = root.join(&layout.cache_dir);
        let package_root = root.join(&layout.package_root);
        let report_dir = root.join(&layout.report_dir);

        Self {
            root: root.to_path_buf(),
            bootstrap_cache: cache_dir.join("virtualenv"),
            pip_cache: cache_dir.join("pip"),
            stamp: package_root.join(STAMP_FILE),
            manifest_dir: root.join(&config.requirements.dir),
            build_dir: root.join(&layout.build_dir),
            xunit_dir: report_dir.join("xunit"),
            coverage_xml: report_dir.join("coverage.xml"),
            dist_dir: root.join(&layout.dist_dir),
            coverage_data: root.join(&layout.coverage_data),
            local_override: ConfigManager::local_override_path(root),
            launcher: root.join(LAUNCHER_FILE),
            cache_dir,
            package_root,
            report_dir,
        }
    }

    /// Executable directory inside the package root
    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.package_root.join("Scripts")
        } else {
            self.package_root.join("bin")
        }
    }

    /// Path of an executable installed in the package root
    pub fn bin(&self, tool: &str) -> PathBuf {
        self.bin_dir().join(tool)
    }

    /// Cached bootstrap archive path
    pub fn archive_path(&self, config: &Config) -> PathBuf {
        self.bootstrap_cache.join(config.bootstrap.archive_name())
    }

    /// Extracted bootstrap source directory
    pub fn bootstrap_source(&self, config: &Config) -> PathBuf {
        self.bootstrap_cache.join(config.bootstrap.source_dir_name())
    }

    /// Environment that activates the package root for child processes
    pub fn activation_env(&self) -> Vec<(OsString, OsString)> {
        let mut paths = vec![self.bin_dir()];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }

        let mut env = vec![(
            OsString::from("VIRTUAL_ENV"),
            self.package_root.clone().into_os_string(),
        )];
        if let Ok(joined) = std::env::join_paths(paths) {
            env.push((OsString::from("PATH"), joined));
        }
        env
    }
}
