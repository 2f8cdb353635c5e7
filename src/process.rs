//! External tool execution
//!
//! Every step of every task is an external process. `ToolRunner` is the single
//! seam through which they are launched, so pipelines can be exercised in
//! tests without a Python toolchain.

use crate::error::{BootenvError, BootenvResult};
use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A single external process launch
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments
    pub args: Vec<OsString>,
    /// Working directory
    pub cwd: PathBuf,
    /// Extra environment variables
    pub env: Vec<(OsString, OsString)>,
    /// Attach stdin to the terminal
    pub interactive: bool,
}

impl Invocation {
    /// Create an invocation running in `cwd`
    pub fn new(program: impl Into<PathBuf>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            env: Vec::new(),
            interactive: false,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Add environment variables
    pub fn envs(mut self, env: Vec<(OsString, OsString)>) -> Self {
        self.env.extend(env);
        self
    }

    /// Inherit stdin for interactive use
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Short tool name used in error messages
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Whether any argument equals `value`
    pub fn has_arg(&self, value: &str) -> bool {
        self.args.iter().any(|a| a == value)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Launches external tools
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run to completion and return the exit code (-1 when killed by a signal)
    async fn run(&self, invocation: &Invocation) -> BootenvResult<i32>;

    /// Run and fail on a non-zero exit code
    async fn run_checked(&self, invocation: &Invocation) -> BootenvResult<()> {
        match self.run(invocation).await? {
            0 => Ok(()),
            code => Err(BootenvError::tool_failed(invocation.tool_name(), code)),
        }
    }
}

/// Runs tools as child processes sharing this terminal
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> BootenvResult<i32> {
        debug!("Executing: {}", invocation);

        let stdin = if invocation.interactive {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(stdin)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| BootenvError::command_failed(invocation.to_string(), e))?;

        debug!("{} exited with {:?}", invocation.tool_name(), status.code());
        Ok(status.code().unwrap_or(-1))
    }
}
