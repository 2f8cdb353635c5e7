//! Interactive interpreter inside the environment

use crate::config::Config;
use crate::error::BootenvResult;
use crate::layout::ProjectLayout;
use crate::process::{Invocation, ToolRunner};

pub fn invocation(layout: &ProjectLayout, config: &Config) -> Invocation {
    Invocation::new(layout.bin(&config.shell.interpreter), &layout.root)
        .envs(layout.activation_env())
        .interactive()
}

/// Blocks until the interpreter exits; a non-zero status is propagated
pub async fn run(tools: &dyn ToolRunner, layout: &ProjectLayout, config: &Config) -> BootenvResult<()> {
    tools.run_checked(&invocation(layout, config)).await
}
