//! bootenv - isolated Python environment task runner
//!
//! CLI entry point that dispatches to tasks and commands.

use bootenv::cli::{Cli, Commands};
use bootenv::config::ConfigManager;
use bootenv::error::{BootenvError, BootenvResult};
use bootenv::layout::ProjectLayout;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> BootenvResult<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise 0 = warn, 1 = info, 2+ = debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("bootenv=warn"),
        1 => EnvFilter::new("bootenv=info"),
        _ => EnvFilter::new("bootenv=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let command = cli.command.unwrap_or(Commands::Default);

    // Completions and plan don't need a project
    match command {
        Commands::Completions(args) => return bootenv::cli::commands::completions(args).await,
        Commands::Plan(args) => return bootenv::cli::commands::plan(args).await,
        _ => {}
    }

    let root = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()
            .map_err(|e| BootenvError::io("getting current directory", e))?,
    };
    if !root.is_dir() {
        return Err(BootenvError::MissingInput(root));
    }
    let root = std::path::absolute(&root)
        .map_err(|e| BootenvError::io(format!("resolving {}", root.display()), e))?;
    debug!("Project root: {}", root.display());

    let mut manager = ConfigManager::new(&root).with_local(!cli.no_local);
    if let Some(path) = cli.config {
        if !path.is_file() {
            return Err(BootenvError::ConfigNotFound(path));
        }
        manager = manager.with_path(path);
    }
    if cli.no_local {
        debug!("Local override disabled (--no-local)");
    }

    let config = manager.load().await?;
    let layout = ProjectLayout::resolve(&root, &config);

    // Dispatch to command
    if let Some(task) = command.task() {
        return bootenv::cli::commands::task(task, &config, &layout).await;
    }

    match command {
        Commands::Status => bootenv::cli::commands::status(&config, &layout).await,
        Commands::Config(args) => bootenv::cli::commands::config(args, &manager, &config).await,
        _ => unreachable!("tasks, plan and completions handled above"),
    }
}
