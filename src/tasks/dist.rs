//! Source distribution

use crate::config::Config;
use crate::error::{BootenvError, BootenvResult};
use crate::layout::ProjectLayout;
use crate::process::{Invocation, ToolRunner};
use tracing::info;

/// Packaging entry point, which must exist before anything runs
pub fn preflight(layout: &ProjectLayout, config: &Config) -> BootenvResult<()> {
    let setup = layout.root.join(&config.dist.setup_script);
    if setup.is_file() {
        Ok(())
    } else {
        Err(BootenvError::MissingInput(setup))
    }
}

pub fn invocation(layout: &ProjectLayout, config: &Config) -> Invocation {
    let mut inv = Invocation::new(layout.bin("python"), &layout.root)
        .arg(layout.root.join(&config.dist.setup_script))
        .arg("sdist")
        .arg("--dist-dir")
        .arg(&layout.dist_dir)
        .envs(layout.activation_env());

    if !config.dist.formats.is_empty() {
        inv = inv.arg(format!("--formats={}", config.dist.formats.join(",")));
    }
    inv
}

pub async fn run(tools: &dyn ToolRunner, layout: &ProjectLayout, config: &Config) -> BootenvResult<()> {
    preflight(layout, config)?;
    info!("Building source distribution into {}", layout.dist_dir.display());
    tools.run_checked(&invocation(layout, config)).await
}
