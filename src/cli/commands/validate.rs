//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, PrimalDualSpec, ValidateArgs};

/// Iteration counts and loss weighting
pub fn format_schedule_info(spec: &PrimalDualSpec) -> String {
    [
        format!("  Outer iterations: {}", spec.n_outer),
        format!("  Inner steps: {}", spec.n_inner),
        format!("  Beta: {}", spec.beta),
    ]
    .join("\n")
}

/// Primal learning rates and dual step sizes
pub fn format_rates_info(spec: &PrimalDualSpec) -> String {
    [
        format!("  Learning rate: {}", spec.learning_rate),
        format!(
            "  Primal rates: tau={} eps={} w={}",
            spec.eta_tau, spec.eta_eps, spec.eta_w
        ),
        format!(
            "  Dual rates: lambda={} gamma={} mu={}",
            spec.eta_lamb, spec.eta_gamma, spec.eta_mu
        ),
    ]
    .join("\n")
}

/// Model, data shape and output locations
pub fn format_run_info(spec: &PrimalDualSpec) -> String {
    let mut lines = vec![
        format!("  Model: {} ({} hidden units)", spec.model, spec.hidden_units),
        format!(
            "  Dataset: {} classes, {} features, {} train / {} test samples",
            spec.dataset.n_classes, spec.dataset.n_features, spec.dataset.n_train, spec.dataset.n_test
        ),
        format!("  Seed: {}", spec.seed()),
        format!("  Stats folder: {}", spec.stats_folder.display()),
    ];
    if let Some(dir) = &spec.checkpoint_folder {
        lines.push(format!("  Checkpoint folder: {}", dir.display()));
    }
    lines.join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");
    log(level, LogLevel::Verbose, &format_schedule_info(&spec));
    log(level, LogLevel::Verbose, &format_rates_info(&spec));
    log(level, LogLevel::Verbose, &format_run_info(&spec));

    Ok(())
}
