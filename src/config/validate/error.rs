//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid n_outer: {0} (must be > 0)")]
    InvalidOuterIterations(usize),

    #[error("Invalid n_inner: {0} (must be > 0)")]
    InvalidInnerSteps(usize),

    #[error("Invalid {key}: {value} (must be finite and >= 0.0)")]
    InvalidRate { key: &'static str, value: f32 },

    #[error("Unknown model '{name}' (registered: {available})")]
    UnknownModel { name: String, available: String },

    #[error("Invalid hidden units: {0} (must be > 0)")]
    InvalidHiddenUnits(usize),

    #[error("Stats folder must not be empty")]
    EmptyStatsFolder,

    #[error("Invalid dataset.{key}: {value} ({reason})")]
    InvalidDataset {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}
