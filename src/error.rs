//! Crate-wide error type
//!
//! Errors carry enough context to act on them without reading the source
//! (which config key, which class, which outer iteration).

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running a primal-dual training run
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, malformed or out-of-range configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Model name not present in the model registry
    #[error("Unknown model '{name}'\n  → Registered models: {available}")]
    UnknownModel { name: String, available: String },

    /// Feature vector length does not match the model input dimension
    #[error("Shape mismatch in {context}: expected {expected} features, got {actual}\n  → Check the dataset feature count against the model input dimension")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A loss value or optimization variable became NaN or infinite
    #[error("Numeric divergence: {quantity} = {value} during {phase} (outer {outer}, step {step})\n  → Lower the learning rates or the dual step sizes")]
    NumericDivergence {
        quantity: String,
        value: f32,
        phase: &'static str,
        outer: usize,
        step: usize,
    },

    /// Training split with no samples
    #[error("Empty dataset for class {0}: at least one training sample is required")]
    EmptyDataset(usize),

    /// Class index outside the dataset's label range
    #[error("Class index {class} out of range (dataset has {n_classes} classes)")]
    ClassOutOfRange { class: usize, n_classes: usize },

    /// Checkpoint could not be read or written
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Metric logging failure
    #[error("Stats logging error: {0}")]
    Stats(#[from] crate::tracking::StatsError),

    /// Optimizer parameter group misuse
    #[error("Optimizer error: {0}")]
    Optim(#[from] crate::optim::OptimError),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error aborts the whole program rather than a single class run
    ///
    /// Configuration problems are shared by every class, so retrying the next
    /// class would fail the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigError(_) | Error::UnknownModel { .. } | Error::ShapeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_lists_available() {
        let err = Error::UnknownModel {
            name: "Resnet".into(),
            available: "LinearTwoHead, MlpTwoHead".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Resnet"));
        assert!(msg.contains("LinearTwoHead"));
    }

    #[test]
    fn test_divergence_message_has_location() {
        let err = Error::NumericDivergence {
            quantity: "mu".into(),
            value: f32::NAN,
            phase: "dual",
            outer: 3,
            step: 60,
        };
        let msg = err.to_string();
        assert!(msg.contains("mu"));
        assert!(msg.contains("outer 3"));
        assert!(msg.contains("dual"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::ConfigError("x".into()).is_fatal());
        assert!(Error::ShapeMismatch {
            context: "forward".into(),
            expected: 2,
            actual: 3
        }
        .is_fatal());
        assert!(!Error::EmptyDataset(0).is_fatal());
        assert!(!Error::Checkpoint("bad".into()).is_fatal());
    }
}
