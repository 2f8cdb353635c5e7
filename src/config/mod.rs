//! Configuration management for bootenv
//!
//! Layers, later ones overriding earlier ones:
//! built-in defaults, user config, project `bootenv.toml`, local override.

pub mod schema;

pub use schema::Config;

use crate::error::{BootenvError, BootenvResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Project configuration file name
pub const PROJECT_CONFIG: &str = "bootenv.toml";

/// Untracked local override file name, removed by `distclean`
pub const LOCAL_OVERRIDE: &str = "bootenv.local.toml";

/// Configuration manager
pub struct ConfigManager {
    project_root: PathBuf,
    config_path: PathBuf,
    user_config_path: Option<PathBuf>,
    use_local: bool,
}

impl ConfigManager {
    /// Create a config manager for a project root
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            config_path: project_root.join(PROJECT_CONFIG),
            user_config_path: Self::default_user_config_path(),
            use_local: true,
            project_root,
        }
    }

    /// Use an explicit project config file instead of `bootenv.toml`
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.config_path = path;
        self
    }

    /// Enable or disable the local override layer
    pub fn with_local(mut self, use_local: bool) -> Self {
        self.use_local = use_local;
        self
    }

    /// Replace (or drop) the user config layer
    pub fn with_user_config(mut self, path: Option<PathBuf>) -> Self {
        self.user_config_path = path;
        self
    }

    /// Default user config path: `~/.config/bootenv/config.toml`
    pub fn default_user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("bootenv").join("config.toml"))
    }

    /// Path of the local override file for a project
    pub fn local_override_path(project_root: &Path) -> PathBuf {
        project_root.join(LOCAL_OVERRIDE)
    }

    /// Project config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load the merged configuration
    pub async fn load(&self) -> BootenvResult<Config> {
        let mut config = Config::default();
        let mut merged = toml::Value::try_from(&config)?;

        let local = Self::local_override_path(&self.project_root);
        let layers = [
            self.user_config_path.as_deref(),
            Some(self.config_path.as_path()),
            self.use_local.then_some(local.as_path()),
        ];

        for path in layers.into_iter().flatten() {
            if let Some(layer) = self.load_layer(path).await? {
                debug!("Merging config layer: {}", path.display());
                merge(&mut merged, layer);
                // Checked per layer so a type error names the file it came from
                config = merged
                    .clone()
                    .try_into()
                    .map_err(|e: toml::de::Error| BootenvError::ConfigInvalid {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    })?;
            }
        }

        Ok(config)
    }

    /// Read one layer; a missing file is not an error
    async fn load_layer(&self, path: &Path) -> BootenvResult<Option<toml::Value>> {
        if !fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| BootenvError::io(format!("reading config from {}", path.display()), e))?;

        let table: toml::Table =
            toml::from_str(&content).map_err(|e| BootenvError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Some(toml::Value::Table(table)))
    }

    /// Write the default configuration to the project config path
    pub async fn init(&self, force: bool) -> BootenvResult<()> {
        if fs::try_exists(&self.config_path).await.unwrap_or(false) && !force {
            return Err(BootenvError::ConfigExists(self.config_path.clone()));
        }

        let content = toml::to_string_pretty(&Config::default())?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            BootenvError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration written to {}", self.config_path.display());
        Ok(())
    }
}

/// Deep-merge `overlay` into `base`; tables merge, everything else replaces
fn merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
