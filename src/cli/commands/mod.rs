//! CLI command implementations

pub mod completions;
pub mod config;
pub mod plan;
pub mod status;
pub mod task;

pub use completions::execute as completions;
pub use config::execute as config;
pub use plan::execute as plan;
pub use status::execute as status;
pub use task::execute as task;
