//! Loading a [`PrimalDualSpec`] from YAML

use super::schema::PrimalDualSpec;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Parse a spec from YAML text without validating it
pub fn parse_config(yaml: &str) -> Result<PrimalDualSpec> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))
}

/// Read, parse and validate a spec file
///
/// # Example
///
/// ```no_run
/// use entrenar_f1::config::load_config;
///
/// let spec = load_config("configs/primal_dual.yaml")?;
/// println!("{} outer iterations", spec.n_outer);
/// # Ok::<(), entrenar_f1::Error>(())
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<PrimalDualSpec> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    let spec = parse_config(&yaml_content)?;
    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    Ok(spec)
}
