//! CLI command handlers.

mod probe;
mod show_config;

pub use probe::run_probe;
pub use show_config::run_show_config;
