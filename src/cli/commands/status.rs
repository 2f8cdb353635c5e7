//! Status command - report environment state without changing it

use crate::config::Config;
use crate::error::BootenvResult;
use crate::layout::ProjectLayout;
use crate::process::SystemRunner;
use crate::provision::{Freshness, HttpFetcher, Provisioner};
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the status command
pub async fn execute(config: &Config, layout: &ProjectLayout) -> BootenvResult<()> {
    let ctx = UiContext::detect();
    let tools = SystemRunner::new();
    let fetcher = HttpFetcher::new(false);
    let status = Provisioner::new(config, layout, &tools, &fetcher)
        .status()
        .await?;

    let rel = |path: &Path| {
        path.strip_prefix(&layout.root)
            .unwrap_or(path)
            .display()
            .to_string()
    };

    ui::intro(&ctx, "bootenv status");

    ui::section(&ctx, "Layout");
    ui::key_value(&ctx, "project", &layout.root.display().to_string());
    ui::key_value(&ctx, "package root", &rel(&layout.package_root));
    ui::key_value(&ctx, "cache", &rel(&layout.cache_dir));
    ui::key_value(&ctx, "reports", &rel(&layout.report_dir));

    ui::section(&ctx, "Bootstrap");
    ui::key_value(&ctx, "virtualenv", &config.bootstrap.version);
    let archive = layout.archive_path(config);
    ui::key_value_status(
        &ctx,
        "archive",
        if archive.is_file() { "cached" } else { "not fetched" },
        archive.is_file(),
    );

    ui::section(&ctx, "Manifests");
    if status.manifests.is_empty() {
        ui::step_warn(
            &ctx,
            &format!(
                "No manifests matching '{}' in {}",
                config.requirements.pattern,
                rel(&layout.manifest_dir)
            ),
        );
    }
    for manifest in &status.manifests {
        ui::step_info(&ctx, &rel(&manifest.path));
    }

    ui::section(&ctx, "Environment");
    ui::key_value_status(
        &ctx,
        "state",
        &status.freshness.to_string(),
        status.freshness.is_current(),
    );
    if let Some(record) = &status.record {
        ui::key_value(
            &ctx,
            "provisioned",
            &record.provisioned_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
    }
    match &status.freshness {
        Freshness::Stale { newer } => {
            for path in newer {
                ui::remark(&ctx, &format!("changed: {}", rel(path)));
            }
        }
        Freshness::ManifestsChanged { changed } => {
            for name in changed {
                ui::remark(&ctx, &format!("changed: {}", name));
            }
        }
        _ => {}
    }

    Ok(())
}
