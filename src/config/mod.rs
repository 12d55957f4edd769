//! Declarative configuration
//!
//! A run is described by one YAML file parsed into a [`PrimalDualSpec`],
//! validated, then optionally adjusted by command-line overrides.

mod cli;
mod loader;
mod schema;
pub mod validate;

pub use cli::{
    apply_overrides, parse_args, Cli, Command, InfoArgs, OutputFormat, TrainArgs, ValidateArgs,
};
pub use loader::{load_config, parse_config};
pub use schema::{DatasetSpec, PrimalDualSpec, DEFAULT_SEED};
pub use validate::{validate_config, ValidationError};
