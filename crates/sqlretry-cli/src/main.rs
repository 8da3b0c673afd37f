use sqlretry_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Logging must be up before any retry policy is built.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable ({err:#}); logging to stderr");
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("sqlretry error: {:#}", err);
        std::process::exit(1);
    }
}
