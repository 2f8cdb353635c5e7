//! Runs a task plan against one project

use super::{clean, dist, shell, Task};
use crate::config::Config;
use crate::error::BootenvResult;
use crate::layout::ProjectLayout;
use crate::process::ToolRunner;
use crate::provision::{Fetcher, ProvisionOutcome, Provisioner};
use crate::report;
use crate::ui::{self, UiContext};
use std::path::PathBuf;
use tracing::debug;

/// Everything a task needs, passed explicitly
pub struct TaskExecutor<'a> {
    config: &'a Config,
    layout: &'a ProjectLayout,
    tools: &'a dyn ToolRunner,
    fetcher: &'a dyn Fetcher,
    ui: &'a UiContext,
}

impl<'a> TaskExecutor<'a> {
    pub fn new(
        config: &'a Config,
        layout: &'a ProjectLayout,
        tools: &'a dyn ToolRunner,
        fetcher: &'a dyn Fetcher,
        ui: &'a UiContext,
    ) -> Self {
        Self {
            config,
            layout,
            tools,
            fetcher,
            ui,
        }
    }

    /// Run `task` and its prerequisites, stopping at the first failure
    pub async fn run(&self, task: Task) -> BootenvResult<()> {
        let plan = task.plan();
        debug!(
            "Plan for {}: {}",
            task,
            plan.iter().map(Task::name).collect::<Vec<_>>().join(" -> ")
        );

        if plan.contains(&Task::Dist) {
            dist::preflight(self.layout, self.config)?;
        }

        for node in plan {
            self.run_node(node).await?;
        }
        Ok(())
    }

    async fn run_node(&self, task: Task) -> BootenvResult<()> {
        match task {
            Task::Default => Ok(()),
            Task::Provision => self.provision().await,
            Task::Check => self.check().await,
            Task::Shell => shell::run(self.tools, self.layout, self.config).await,
            Task::Mostlyclean => {
                ui::step_skip(self.ui, "mostlyclean", "nothing to remove");
                Ok(())
            }
            Task::Clean => self
                .remove("clean", &clean::clean_targets(self.layout))
                .await,
            Task::Distclean => self
                .remove("distclean", &clean::distclean_targets(self.layout))
                .await,
            Task::MaintainerClean => {
                ui::remark(self.ui, clean::MAINTAINER_NOTICE);
                Ok(())
            }
            Task::Dist => {
                dist::run(self.tools, self.layout, self.config).await?;
                ui::step_ok(
                    self.ui,
                    &format!("Source distribution in {}", self.relative(&self.layout.dist_dir)),
                );
                Ok(())
            }
        }
    }

    async fn provision(&self) -> BootenvResult<()> {
        let provisioner = Provisioner::new(self.config, self.layout, self.tools, self.fetcher);
        match provisioner.ensure().await? {
            ProvisionOutcome::UpToDate => ui::step_ok(self.ui, "Environment up to date"),
            ProvisionOutcome::Rebuilt(reason) => ui::step_ok(
                self.ui,
                &format!("Environment provisioned (was {})", reason),
            ),
        }
        Ok(())
    }

    async fn check(&self) -> BootenvResult<()> {
        let report = report::run_tests(self.tools, self.layout, self.config).await?;

        ui::key_value(self.ui, "xunit", &self.relative(&report.xunit));
        ui::key_value(self.ui, "coverage", &self.relative(&report.coverage));
        if report.passed() {
            ui::step_ok(self.ui, "Tests passed");
        } else {
            ui::step_warn(self.ui, "Tests failed");
        }

        report.into_result().map(|_| ())
    }

    async fn remove(&self, name: &str, targets: &[PathBuf]) -> BootenvResult<()> {
        let removed = clean::remove_all(targets).await?;
        if removed.is_empty() {
            ui::step_skip(self.ui, name, "nothing to remove");
        }
        for path in removed {
            ui::step_ok(self.ui, &format!("Removed {}", self.relative(&path)));
        }
        Ok(())
    }

    fn relative(&self, path: &std::path::Path) -> String {
        path.strip_prefix(&self.layout.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootenvError;
    use crate::process::Invocation;
    use crate::testing::{bootstrap_archive, RecordingRunner, StubFetcher};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        config: Config,
        layout: ProjectLayout,
        ui: UiContext,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("requirements.txt"), "coverage\n").unwrap();
            let config = Config::default();
            let layout = ProjectLayout::resolve(dir.path(), &config);
            Self {
                dir,
                config,
                layout,
                ui: UiContext::non_interactive(),
            }
        }

        async fn run(
            &self,
            task: Task,
            tools: &RecordingRunner,
            fetcher: &StubFetcher,
        ) -> BootenvResult<()> {
            TaskExecutor::new(&self.config, &self.layout, tools, fetcher, &self.ui)
                .run(task)
                .await
        }

        fn fetcher(&self) -> StubFetcher {
            StubFetcher::new(bootstrap_archive(&self.config))
        }
    }

    fn is_test_run(inv: &Invocation) -> bool {
        inv.tool_name() == "coverage" && inv.has_arg("run")
    }

    #[tokio::test]
    async fn check_on_fresh_checkout_bootstraps_then_tests() {
        let fx = Fixture::new();
        let tools = RecordingRunner::succeeding();
        let fetcher = fx.fetcher();

        fx.run(Task::Check, &tools, &fetcher).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(tools.tools(), ["python", "pip", "coverage", "coverage"]);
        assert!(fx.layout.stamp.is_file());
        assert!(!fx.layout.launcher.exists());
    }

    #[tokio::test]
    async fn check_with_current_environment_goes_straight_to_tests() {
        let fx = Fixture::new();
        let fetcher = fx.fetcher();
        fx.run(Task::Default, &RecordingRunner::succeeding(), &fetcher)
            .await
            .unwrap();

        let tools = RecordingRunner::succeeding();
        fx.run(Task::Check, &tools, &fetcher).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(tools.tools(), ["coverage", "coverage"]);
    }

    #[tokio::test]
    async fn failing_tests_fail_the_task_after_cleanup() {
        let fx = Fixture::new();
        let tools = RecordingRunner::new(|inv| if is_test_run(inv) { 1 } else { 0 });

        let err = fx.run(Task::Check, &tools, &fx.fetcher()).await.unwrap_err();

        assert!(matches!(err, BootenvError::TestsFailed { code: 1 }));
        assert_eq!(err.exit_code(), 1);
        assert!(!fx.layout.launcher.exists());
        assert_eq!(tools.tools().last().map(String::as_str), Some("coverage"));
    }

    #[tokio::test]
    async fn check_without_manifests_is_fatal() {
        let fx = Fixture::new();
        fs::remove_file(fx.dir.path().join("requirements.txt")).unwrap();
        let tools = RecordingRunner::succeeding();

        let err = fx.run(Task::Check, &tools, &fx.fetcher()).await.unwrap_err();

        assert!(matches!(err, BootenvError::NoManifests { .. }));
        assert!(tools.invocations().is_empty());
    }

    #[tokio::test]
    async fn dist_without_setup_script_fails_before_provisioning() {
        let fx = Fixture::new();
        let tools = RecordingRunner::succeeding();
        let fetcher = fx.fetcher();

        let err = fx.run(Task::Dist, &tools, &fetcher).await.unwrap_err();

        assert!(matches!(err, BootenvError::MissingInput(_)));
        assert_eq!(fetcher.calls(), 0);
        assert!(tools.invocations().is_empty());
    }

    #[tokio::test]
    async fn dist_runs_sdist_after_provisioning() {
        let fx = Fixture::new();
        fs::write(fx.dir.path().join("setup.py"), "").unwrap();
        let tools = RecordingRunner::succeeding();

        fx.run(Task::Dist, &tools, &fx.fetcher()).await.unwrap();

        let last = tools.invocations().pop().unwrap();
        assert_eq!(last.program, fx.layout.bin("python"));
        assert!(last.has_arg("sdist"));
    }

    #[tokio::test]
    async fn shell_exit_status_propagates() {
        let fx = Fixture::new();
        let tools = RecordingRunner::new(|inv| if inv.interactive { 4 } else { 0 });

        let err = fx.run(Task::Shell, &tools, &fx.fetcher()).await.unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn clean_then_distclean_lifecycle() {
        let fx = Fixture::new();
        let fetcher = fx.fetcher();
        let tools = RecordingRunner::succeeding();
        fx.run(Task::Check, &tools, &fetcher).await.unwrap();
        fs::write(&fx.layout.local_override, "").unwrap();

        fx.run(Task::Clean, &tools, &fetcher).await.unwrap();
        assert!(!fx.layout.package_root.exists());
        assert!(!fx.layout.report_dir.exists());
        assert!(fx.layout.archive_path(&fx.config).is_file());
        assert!(fx.layout.local_override.exists());

        fx.run(Task::Clean, &tools, &fetcher).await.unwrap();

        fx.run(Task::Distclean, &tools, &fetcher).await.unwrap();
        assert!(!fx.layout.cache_dir.exists());
        assert!(!fx.layout.local_override.exists());
        assert!(fx.dir.path().join("requirements.txt").exists());
    }

    #[tokio::test]
    async fn maintainer_clean_removes_what_distclean_does() {
        let fx = Fixture::new();
        let fetcher = fx.fetcher();
        let tools = RecordingRunner::succeeding();
        fx.run(Task::Default, &tools, &fetcher).await.unwrap();
        fs::write(&fx.layout.local_override, "").unwrap();

        fx.run(Task::MaintainerClean, &tools, &fetcher).await.unwrap();

        for path in clean::clean_targets(&fx.layout)
            .into_iter()
            .chain(clean::distclean_targets(&fx.layout))
        {
            assert!(!path.exists(), "{} survived", path.display());
        }
    }

    #[tokio::test]
    async fn mostlyclean_touches_nothing() {
        let fx = Fixture::new();
        fs::create_dir_all(&fx.layout.package_root).unwrap();
        let tools = RecordingRunner::succeeding();

        fx.run(Task::Mostlyclean, &tools, &fx.fetcher()).await.unwrap();

        assert!(fx.layout.package_root.is_dir());
        assert!(tools.invocations().is_empty());
    }
}
