//! Configuration schema for bootenv
//!
//! Project configuration lives in `bootenv.toml` at the project root, with
//! an optional untracked `bootenv.local.toml` layered on top of it. All
//! relative paths are resolved against the project root.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filesystem layout
    pub layout: LayoutConfig,

    /// Bootstrap tool (virtualenv) settings
    pub bootstrap: BootstrapConfig,

    /// Requirement manifest discovery and installation
    pub requirements: RequirementsConfig,

    /// Test discovery settings
    pub tests: TestsConfig,

    /// Interactive shell settings
    pub shell: ShellConfig,

    /// Source distribution settings
    pub dist: DistConfig,
}

/// Paths used by every task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Durable download cache, survives `clean`
    pub cache_dir: PathBuf,

    /// Isolated package root
    pub package_root: PathBuf,

    /// Build output directory
    pub build_dir: PathBuf,

    /// Test and coverage report directory
    pub report_dir: PathBuf,

    /// Source distribution output directory
    pub dist_dir: PathBuf,

    /// Coverage data file written by `coverage run`
    pub coverage_data: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache"),
            package_root: PathBuf::from(".pkg"),
            build_dir: PathBuf::from("build"),
            report_dir: PathBuf::from("build/report"),
            dist_dir: PathBuf::from("dist"),
            coverage_data: PathBuf::from(".coverage"),
        }
    }
}

/// Pinned bootstrap tool used to create the package root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// virtualenv release to bootstrap from
    pub version: String,

    /// Download URL; `{version}` is substituted
    pub url: String,

    /// Expected SHA-256 of the archive (hex), verified after download
    pub sha256: Option<String>,

    /// Host interpreter that runs the bootstrap script
    pub python: String,

    /// Bootstrap script, relative to the extracted archive root
    pub script: String,

    /// Extra arguments passed to the bootstrap script
    pub args: Vec<String>,
}

impl BootstrapConfig {
    /// Directory name the archive extracts to
    pub fn source_dir_name(&self) -> String {
        format!("virtualenv-{}", self.version)
    }

    /// File name of the cached archive
    pub fn archive_name(&self) -> String {
        format!("{}.tar.gz", self.source_dir_name())
    }

    /// Download URL with the version substituted
    pub fn archive_url(&self) -> String {
        self.url.replace("{version}", &self.version)
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            version: "1.7.1.2".to_string(),
            url: "http://pypi.python.org/packages/source/v/virtualenv/virtualenv-{version}.tar.gz"
                .to_string(),
            sha256: None,
            python: "python".to_string(),
            script: "virtualenv.py".to_string(),
            args: vec!["--no-site-packages".to_string()],
        }
    }
}

/// Requirement manifest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsConfig {
    /// Directory searched for manifests
    pub dir: PathBuf,

    /// File name glob selecting manifests
    pub pattern: String,

    /// Extra arguments appended to every `pip install`
    pub install_args: Vec<String>,
}

impl Default for RequirementsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            pattern: "requirements*".to_string(),
            install_args: vec![],
        }
    }
}

/// Test discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestsConfig {
    /// Directory where unittest discovery starts
    pub start_dir: PathBuf,

    /// Module name pattern for discovery
    pub pattern: String,

    /// Top-level directory of the project for imports (defaults to project root)
    pub top_level_dir: Option<PathBuf>,

    /// Name of the xUnit report file written under `xunit/`
    pub report_name: String,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            start_dir: PathBuf::from("."),
            pattern: "*_test.py".to_string(),
            top_level_dir: None,
            report_name: "TEST-bootenv.xml".to_string(),
        }
    }
}

/// Interactive shell settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Interpreter launched from the package root's bin directory
    pub interpreter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
        }
    }
}

/// Source distribution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistConfig {
    /// Packaging entry point, relative to the project root
    pub setup_script: PathBuf,

    /// Archive formats passed as `--formats` (empty = tool default)
    pub formats: Vec<String>,
}

impl Default for DistConfig {
    fn default() -> Self {
        Self {
            setup_script: PathBuf::from("setup.py"),
            formats: vec![],
        }
    }
}
