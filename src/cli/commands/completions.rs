//! Completions command - print shell completion scripts

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::BootenvResult;
use clap::CommandFactory;

/// Execute the completions command
pub async fn execute(args: CompletionsArgs) -> BootenvResult<()> {
    let mut command = Cli::command();
    clap_complete::generate(args.shell, &mut command, "bootenv", &mut std::io::stdout());
    Ok(())
}
