//! Constraint-aware Lagrangian term of the primal loss

use crate::autograd::{add, mul, scale, sub};
use crate::Tensor;

/// Multipliers of one sample, read as constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualSnapshot {
    pub mu: f32,
    pub lambda_i: f32,
    pub gamma_i: f32,
}

/// Per-sample Lagrangian term
///
/// ```text
/// t2 = (mu - 2y/P) * tau_i + lambda_i * y * (tau_i - w * s) + gamma_i * y * (tau_i - eps)
/// ```
///
/// `2y/P` is 0 for negative samples, so `P = 0` never divides. The result is
/// differentiable with respect to `score`, `w`, `eps` and `tau_i`; the
/// multipliers never receive gradient.
///
/// All tensor arguments are single-element.
pub fn lagrangian_term(
    label: u8,
    n_positives: usize,
    score: &Tensor,
    tau_i: &Tensor,
    eps: &Tensor,
    w: &Tensor,
    dual: DualSnapshot,
) -> Tensor {
    let y = f32::from(label);
    let positive_weight = if label == 1 && n_positives > 0 {
        2.0 / n_positives as f32
    } else {
        0.0
    };

    let threshold = scale(tau_i, dual.mu - positive_weight);
    let score_gap = scale(&sub(tau_i, &mul(w, score)), dual.lambda_i * y);
    let slack_gap = scale(&sub(tau_i, eps), dual.gamma_i * y);

    add(&add(&threshold, &score_gap), &slack_gap)
}
