//! CLI command implementations

mod info;
mod train;
mod validate;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};
use crate::telemetry;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    if let Err(e) = telemetry::init_tracing(log_level.tracing_directive()) {
        eprintln!("Warning: {e}");
    }

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
    }
}
