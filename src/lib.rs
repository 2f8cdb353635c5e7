//! bootenv - isolated Python environment task runner
//!
//! Provisions a package root from a pinned virtualenv release, installs
//! requirement manifests into it, and runs test, shell, packaging and
//! clean tasks against it.

pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod process;
pub mod provision;
pub mod report;
pub mod tasks;
pub mod ui;

#[cfg(test)]
mod testing;

pub use error::{BootenvError, BootenvResult};
