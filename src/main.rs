//! entrenar-f1 CLI
//!
//! # Usage
//!
//! ```bash
//! # Train every class from a config
//! entrenar-f1 train configs/primal_dual.yaml
//!
//! # Train with overrides
//! entrenar-f1 train configs/primal_dual.yaml --seed 7 --n-outer 20
//!
//! # Validate config
//! entrenar-f1 validate configs/primal_dual.yaml
//!
//! # Show config info
//! entrenar-f1 info configs/primal_dual.yaml --format yaml
//! ```

use clap::Parser;
use entrenar_f1::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
