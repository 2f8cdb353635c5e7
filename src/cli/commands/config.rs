//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::BootenvResult;
use crate::ui::{self, UiContext};

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> BootenvResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => {
            manager.init(force).await?;
            ui::step_ok(
                &UiContext::detect(),
                &format!("Configuration written to {}", manager.path().display()),
            );
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> BootenvResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
