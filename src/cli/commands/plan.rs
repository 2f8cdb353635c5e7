//! Plan command - show what a task would run

use crate::cli::args::PlanArgs;
use crate::error::BootenvResult;
use console::style;

/// Execute the plan command
pub async fn execute(args: PlanArgs) -> BootenvResult<()> {
    for (i, task) in args.task.plan().iter().enumerate() {
        let prerequisites: Vec<_> = task.prerequisites().iter().map(|t| t.name()).collect();
        if prerequisites.is_empty() {
            println!("{}. {}", i + 1, style(task).cyan());
        } else {
            println!(
                "{}. {} {}",
                i + 1,
                style(task).cyan(),
                style(format!("(after {})", prerequisites.join(", "))).dim()
            );
        }
    }
    Ok(())
}
