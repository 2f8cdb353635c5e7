//! Named tasks and their prerequisite graph
//!
//! Each task lists the tasks that must run before it. `Task::plan` expands
//! that into a flat, duplicate-free execution order.

mod clean;
mod dist;
mod executor;
mod shell;

pub use executor::TaskExecutor;

use clap::ValueEnum;
use std::fmt;

/// A named operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Task {
    /// Provision the environment and do nothing else
    Default,
    /// Create or refresh the package root (internal prerequisite)
    Provision,
    /// Run the test suite with xUnit and coverage reports
    Check,
    /// Interactive interpreter inside the environment
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
}

impl Task {
    /// Every task, in declaration order
    pub const ALL: [Task; 9] = [
        Task::Default,
        Task::Provision,
        Task::Check,
        Task::Shell,
        Task::Mostlyclean,
        Task::Clean,
        Task::Distclean,
        Task::MaintainerClean,
        Task::Dist,
    ];

    /// Task name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Provision => "provision",
            Self::Check => "check",
            Self::Shell => "shell",
            Self::Mostlyclean => "mostlyclean",
            Self::Clean => "clean",
            Self::Distclean => "distclean",
            Self::MaintainerClean => "maintainer-clean",
            Self::Dist => "dist",
        }
    }

    /// Tasks that must complete first
    pub fn prerequisites(&self) -> &'static [Task] {
        match self {
            Self::Default | Self::Check | Self::Shell | Self::Dist => &[Task::Provision],
            Self::Distclean => &[Task::Clean],
            Self::MaintainerClean => &[Task::Distclean],
            Self::Provision | Self::Mostlyclean | Self::Clean => &[],
        }
    }

    /// Prerequisites first, each task once, `self` last
    pub fn plan(self) -> Vec<Task> {
        let mut order = Vec::new();
        visit(self, &mut order);
        order
    }
}

fn visit(task: Task, order: &mut Vec<Task>) {
    if order.contains(&task) {
        return;
    }
    for prerequisite in task.prerequisites() {
        visit(*prerequisite, order);
    }
    order.push(task);
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
