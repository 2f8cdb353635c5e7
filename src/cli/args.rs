//! CLI argument definitions using clap derive

use crate::tasks::Task;
use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use std::path::PathBuf;

/// bootenv - isolated Python environment task runner
///
/// Bootstraps a pinned virtualenv, installs requirement manifests into it,
/// and runs the project's test, shell, packaging and clean tasks.
#[derive(Parser, Debug)]
#[command(name = "bootenv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Task to run (defaults to `default`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project root (defaults to current directory)
    #[arg(short = 'C', long = "directory", global = true, env = "BOOTENV_DIR")]
    pub directory: Option<PathBuf>,

    /// Project configuration file (defaults to <root>/bootenv.toml)
    #[arg(short, long, global = true, env = "BOOTENV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip the bootenv.local.toml override
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision the environment if needed
    #[command(visible_alias = "build")]
    Default,

    /// Run the test suite with xUnit and coverage reports
    #[command(visible_alias = "test")]
    Check,

    /// Start an interactive interpreter inside the environment
    Shell,

    /// Remove cheap derived artifacts
    Mostlyclean,

    /// Remove build outputs, coverage data and the package root
    Clean,

    /// Clean, plus the download cache and local override
    Distclean,

    /// Distclean, for maintainers
    MaintainerClean,

    /// Build a source distribution
    Dist,

    /// Show environment freshness and layout
    Status,

    /// Print the execution plan for a task
    Plan(PlanArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// The task this command runs, if it is one
    pub fn task(&self) -> Option<Task> {
        match self {
            Self::Default => Some(Task::Default),
            Self::Check => Some(Task::Check),
            Self::Shell => Some(Task::Shell),
            Self::Mostlyclean => Some(Task::Mostlyclean),
            Self::Clean => Some(Task::Clean),
            Self::Distclean => Some(Task::Distclean),
            Self::MaintainerClean => Some(Task::MaintainerClean),
            Self::Dist => Some(Task::Dist),
            Self::Status | Self::Plan(_) | Self::Config(_) | Self::Completions(_) => None,
        }
    }
}

/// Arguments for the plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Task to expand
    #[arg(value_enum)]
    pub task: Task,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective (merged) configuration
    Show,

    /// Show project configuration file path
    Path,

    /// Write a default bootenv.toml
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
