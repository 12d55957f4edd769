//! Info command implementation

use super::validate::{format_rates_info, format_run_info, format_schedule_info};
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, InfoArgs, OutputFormat, PrimalDualSpec};

/// Render `spec` in the requested format
pub fn render_info(spec: &PrimalDualSpec, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Text => Ok([
            format_schedule_info(spec),
            format_rates_info(spec),
            format_run_info(spec),
        ]
        .join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(spec)
            .map_err(|e| format!("JSON serialization error: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(spec).map_err(|e| format!("YAML serialization error: {e}"))
        }
    }
}

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    if args.format == OutputFormat::Text {
        log(level, LogLevel::Normal, "Configuration Info:");
    }
    println!("{}", render_info(&spec, args.format)?);

    Ok(())
}
