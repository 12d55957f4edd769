//! Full-batch dual update

use super::{DualVariables, PrimalVariables};
use crate::data::BinaryDataset;
use crate::error::{Error, Result};
use crate::models::ConstrainedModel;
use crate::Tensor;
use ndarray::Array1;

/// Step sizes of the multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualRates {
    pub lambda: f32,
    pub gamma: f32,
    pub mu: f32,
}

/// Statistics gathered by one pass over the training split
#[derive(Debug, Clone, PartialEq)]
pub struct DualCaches {
    /// Sum of `tau` over every sample
    pub mu_cache: f32,
    pub lambda_cache: Array1<f32>,
    pub gamma_cache: Array1<f32>,
}

/// Sweep the training split once with the model in inference mode
///
/// Reads `tau`, `eps`, `w` and the model; writes nothing.
pub fn accumulate(
    model: &dyn ConstrainedModel,
    train: &BinaryDataset,
    primal: &PrimalVariables,
    rates: &DualRates,
) -> Result<DualCaches> {
    let n = train.len();
    let tau = primal.tau.data();
    let eps = primal.eps_value();
    let w = primal.w_value();

    let mut caches = DualCaches {
        mu_cache: 0.0,
        lambda_cache: Array1::zeros(n),
        gamma_cache: Array1::zeros(n),
    };

    for (j, sample) in train.iter().enumerate() {
        let score = model
            .predict(&Tensor::constant(sample.features.clone()))?
            .score
            .item();
        let y = f32::from(sample.label);

        caches.mu_cache += tau[j];
        caches.lambda_cache[j] = rates.lambda * y * (tau[j] - w * score);
        caches.gamma_cache[j] = rates.gamma * y * (tau[j] - eps);
    }

    Ok(caches)
}

/// Additive update of the multipliers from accumulated statistics
pub fn apply_update(dual: &mut DualVariables, caches: &DualCaches, eta_mu: f32) {
    dual.mu += eta_mu * (caches.mu_cache - 1.0);
    dual.lambda += &caches.lambda_cache;
    dual.gamma += &caches.gamma_cache;
}

/// Accumulate, then assign the updated multipliers
///
/// Non-finite multipliers are reported, never clamped, and leave `dual` as it
/// was before the call.
pub fn dual_step(
    model: &dyn ConstrainedModel,
    train: &BinaryDataset,
    primal: &PrimalVariables,
    dual: &mut DualVariables,
    rates: &DualRates,
    outer: usize,
    step: usize,
) -> Result<()> {
    if train.len() != primal.len() || train.len() != dual.len() {
        return Err(Error::ShapeMismatch {
            context: "dual step".into(),
            expected: train.len(),
            actual: primal.len().min(dual.len()),
        });
    }

    let caches = accumulate(model, train, primal, rates)?;
    let mut updated = dual.clone();
    apply_update(&mut updated, &caches, rates.mu);

    // a diverged update is never committed
    if let Some((quantity, value)) = updated.first_non_finite() {
        return Err(Error::NumericDivergence {
            quantity: quantity.to_string(),
            value,
            phase: "dual",
            outer,
            step,
        });
    }
    *dual = updated;
    Ok(())
}
