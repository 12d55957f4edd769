//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::{DatasetSpec, PrimalDualSpec};
use crate::models;

/// Validate a primal-dual specification
///
/// Checks:
/// - Iteration counts are positive
/// - Learning rates, dual step sizes and `beta` are finite and non-negative
/// - The model name is registered
/// - The synthetic dataset shape is usable
pub fn validate_config(spec: &PrimalDualSpec) -> Result<(), ValidationError> {
    if spec.n_outer == 0 {
        return Err(ValidationError::InvalidOuterIterations(spec.n_outer));
    }
    if spec.n_inner == 0 {
        return Err(ValidationError::InvalidInnerSteps(spec.n_inner));
    }

    let rates = [
        ("learning rate", spec.learning_rate),
        ("eta_tau", spec.eta_tau),
        ("eta_eps", spec.eta_eps),
        ("eta_w", spec.eta_w),
        ("eta_lamb", spec.eta_lamb),
        ("eta_gamma", spec.eta_gamma),
        ("eta_mu", spec.eta_mu),
        ("beta", spec.beta),
    ];
    for (key, value) in rates {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidRate { key, value });
        }
    }

    if !models::is_registered(&spec.model) {
        return Err(ValidationError::UnknownModel {
            name: spec.model.clone(),
            available: models::registered_names().join(", "),
        });
    }

    if spec.hidden_units == 0 {
        return Err(ValidationError::InvalidHiddenUnits(spec.hidden_units));
    }

    if spec.stats_folder.as_os_str().is_empty() {
        return Err(ValidationError::EmptyStatsFolder);
    }

    validate_dataset(&spec.dataset)
}

fn validate_dataset(dataset: &DatasetSpec) -> Result<(), ValidationError> {
    let counts = [
        ("n_classes", dataset.n_classes),
        ("n_features", dataset.n_features),
        ("n_train", dataset.n_train),
        ("doc_length", dataset.doc_length),
    ];
    for (key, value) in counts {
        if value == 0 {
            return Err(ValidationError::InvalidDataset {
                key,
                value: value.to_string(),
                reason: "must be > 0",
            });
        }
    }

    if !dataset.mean_n_labels.is_finite() || dataset.mean_n_labels <= 0.0 {
        return Err(ValidationError::InvalidDataset {
            key: "mean_n_labels",
            value: dataset.mean_n_labels.to_string(),
            reason: "must be finite and > 0.0",
        });
    }

    Ok(())
}
