//! Terminal output for bootenv
//!
//! Uses `cliclack` step logging in an interactive terminal and falls back to
//! plain `[OK]`/`[WARN]` lines in CI or when output is piped.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_error, outro_success, remark, section, step_info,
    step_ok, step_skip, step_warn,
};
pub use progress::DownloadProgress;
