//! Task commands - run a named task and its prerequisites

use crate::config::Config;
use crate::error::BootenvResult;
use crate::layout::ProjectLayout;
use crate::process::SystemRunner;
use crate::provision::HttpFetcher;
use crate::tasks::{Task, TaskExecutor};
use crate::ui::{self, UiContext};

/// Execute a task against the project
pub async fn execute(task: Task, config: &Config, layout: &ProjectLayout) -> BootenvResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, &format!("bootenv {}", task));

    let tools = SystemRunner::new();
    let fetcher = HttpFetcher::new(ctx.use_fancy_output());
    let result = TaskExecutor::new(config, layout, &tools, &fetcher, &ctx)
        .run(task)
        .await;

    match &result {
        Ok(()) => ui::outro_success(&ctx, &format!("{} complete", task)),
        Err(_) => ui::outro_error(&ctx, &format!("{} failed", task)),
    }
    result
}
