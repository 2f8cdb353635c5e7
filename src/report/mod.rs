//! Test execution with xUnit and coverage reports
//!
//! Both artifacts are written even when tests fail:
//!
//! | Artifact | Path |
//! |----------|------|
//! | xUnit results | `build/report/xunit/<report_name>` |
//! | Coverage | `build/report/coverage.xml` |

pub mod launcher;

pub use launcher::LauncherScript;

use crate::config::Config;
use crate::error::{BootenvError, BootenvResult};
use crate::layout::ProjectLayout;
use crate::process::{Invocation, ToolRunner};
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

/// Outcome of a test run whose reports were emitted
#[derive(Debug, Clone)]
pub struct TestReport {
    /// Exit code of the test run
    pub exit_code: i32,
    /// xUnit result file
    pub xunit: PathBuf,
    /// Coverage XML file
    pub coverage: PathBuf,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a failing run into `TestsFailed`
    pub fn into_result(self) -> BootenvResult<Self> {
        if self.passed() {
            Ok(self)
        } else {
            Err(BootenvError::TestsFailed {
                code: self.exit_code,
            })
        }
    }
}

/// Remove and recreate the report directory
pub async fn prepare_report_dir(layout: &ProjectLayout) -> BootenvResult<()> {
    crate::provision::remove_dir(&layout.report_dir).await?;
    fs::create_dir_all(&layout.xunit_dir).await.map_err(|e| {
        BootenvError::io(format!("creating directory {}", layout.xunit_dir.display()), e)
    })
}

fn coverage_env(layout: &ProjectLayout) -> Vec<(OsString, OsString)> {
    let mut env = layout.activation_env();
    env.push((
        OsString::from("COVERAGE_FILE"),
        layout.coverage_data.clone().into_os_string(),
    ));
    env
}

/// `coverage run` over the launcher
pub fn run_invocation(layout: &ProjectLayout, launcher: &LauncherScript) -> Invocation {
    let mut omit = OsString::from("--omit=");
    omit.push(launcher.path());

    Invocation::new(layout.bin("coverage"), &layout.root)
        .arg("run")
        .arg(omit)
        .arg(launcher.path())
        .envs(coverage_env(layout))
}

/// `coverage xml` into the report directory
pub fn xml_invocation(layout: &ProjectLayout, launcher: &LauncherScript) -> Invocation {
    let mut omit = OsString::from("--omit=");
    omit.push(launcher.path());

    Invocation::new(layout.bin("coverage"), &layout.root)
        .arg("xml")
        .arg(omit)
        .arg("-o")
        .arg(&layout.coverage_xml)
        .envs(coverage_env(layout))
}

/// Run the test suite under coverage and emit both reports.
///
/// Returns the report even when tests fail; the launcher is gone by the
/// time this returns, on every path.
pub async fn run_tests(
    runner: &dyn ToolRunner,
    layout: &ProjectLayout,
    config: &Config,
) -> BootenvResult<TestReport> {
    prepare_report_dir(layout).await?;

    let launcher =
        LauncherScript::acquire(&layout.launcher, &launcher::render(layout, config)).await?;

    let exit_code = runner.run(&run_invocation(layout, &launcher)).await?;
    if exit_code != 0 {
        warn!("Test run exited with status {}", exit_code);
    }

    let coverage = runner.run_checked(&xml_invocation(layout, &launcher)).await;
    launcher.release().await?;
    match coverage {
        Err(e) if exit_code != 0 => warn!("Coverage report failed: {}", e),
        other => other?,
    }

    info!("Reports written to {}", layout.report_dir.display());
    Ok(TestReport {
        exit_code,
        xunit: layout.xunit_dir.join(&config.tests.report_name),
        coverage: layout.coverage_xml.clone(),
    })
}
