//! Command-line argument types

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::schema::PrimalDualSpec;

/// Primal-dual F1-constrained one-vs-rest trainer
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "entrenar-f1")]
#[command(version)]
#[command(
    about = "Train one-vs-rest classifiers under an F1-style constraint with primal-dual optimization"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train every class from a YAML configuration
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// Display information about a configuration
    Info(InfoArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override number of outer iterations
    #[arg(long)]
    pub n_outer: Option<usize>,

    /// Override the stats folder
    #[arg(long)]
    pub stats_folder: Option<PathBuf>,

    /// Dry run (validate config but don't train)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Output format for the info command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a spec
pub fn apply_overrides(spec: &mut PrimalDualSpec, args: &TrainArgs) {
    if let Some(seed) = args.seed {
        spec.seed = Some(seed);
    }
    if let Some(n_outer) = args.n_outer {
        spec.n_outer = n_outer;
    }
    if let Some(stats_folder) = &args.stats_folder {
        spec.stats_folder = stats_folder.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_with_overrides() {
        let cli = parse_args([
            "entrenar-f1",
            "train",
            "run.yaml",
            "--seed",
            "9",
            "--n-outer",
            "3",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.config, PathBuf::from("run.yaml"));
                assert_eq!(args.seed, Some(9));
                assert_eq!(args.n_outer, Some(3));
                assert!(args.dry_run);
                assert!(args.stats_folder.is_none());
            }
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = parse_args(["entrenar-f1", "validate", "run.yaml", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_info_format() {
        let cli = parse_args(["entrenar-f1", "info", "run.yaml", "--format", "json"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Info(InfoArgs {
                config: PathBuf::from("run.yaml"),
                format: OutputFormat::Json,
            })
        );
    }

    #[test]
    fn test_missing_config_rejected() {
        assert!(parse_args(["entrenar-f1", "train"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let yaml = r#"
n_outer: 10
n_inner: 5
learning rate: 0.1
eta_tau: 0.1
eta_eps: 0.1
eta_w: 0.1
eta_lamb: 0.1
eta_gamma: 0.1
eta_mu: 0.1
beta: 0.1
stats folder: stats
model: LinearTwoHead
"#;
        let mut spec: PrimalDualSpec = serde_yaml::from_str(yaml).unwrap();
        let args = TrainArgs {
            config: PathBuf::from("x.yaml"),
            seed: Some(5),
            n_outer: Some(2),
            stats_folder: Some(PathBuf::from("elsewhere")),
            dry_run: false,
        };

        apply_overrides(&mut spec, &args);

        assert_eq!(spec.seed(), 5);
        assert_eq!(spec.n_outer, 2);
        assert_eq!(spec.stats_folder, PathBuf::from("elsewhere"));
        assert_eq!(spec.n_inner, 5);
    }
}
