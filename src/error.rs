//! Error types for bootenv
//!
//! All modules use `BootenvResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bootenv operations
pub type BootenvResult<T> = Result<T, BootenvError>;

/// All errors that can occur in bootenv
#[derive(Error, Debug)]
pub enum BootenvError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Configuration already exists: {0}")]
    ConfigExists(PathBuf),

    // Provisioning errors
    #[error("No requirement manifests matching '{pattern}' in {dir}")]
    NoManifests { dir: PathBuf, pattern: String },

    #[error("Invalid manifest pattern '{pattern}': {reason}")]
    ManifestPattern { pattern: String, reason: String },

    #[error("Required input not found: {0}")]
    MissingInput(PathBuf),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Failed to extract {archive}: {reason}")]
    Extract { archive: PathBuf, reason: String },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with status {code}")]
    ToolFailed { tool: String, code: i32 },

    #[error("Test run failed (exit code {code})")]
    TestsFailed { code: i32 },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BootenvError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a tool failure from its exit code
    pub fn tool_failed(tool: impl Into<String>, code: i32) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            code,
        }
    }

    /// Process exit code to report for this error.
    ///
    /// Failures of external tools surface with the tool's own status.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ToolFailed { code, .. } | Self::TestsFailed { code } => {
                u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoManifests { .. } => {
                Some("Add a requirements.txt or set requirements.pattern in bootenv.toml")
            }
            Self::Fetch { .. } => Some("Check bootstrap.url, or place the archive in the cache directory"),
            Self::ChecksumMismatch { .. } => {
                Some("Run: bootenv distclean, then retry (or update bootstrap.sha256)")
            }
            Self::ConfigExists(_) => Some("Use --force to overwrite"),
            Self::CommandFailed { .. } => Some("Run: bootenv clean, then retry to rebuild the environment"),
            _ => None,
        }
    }
}
