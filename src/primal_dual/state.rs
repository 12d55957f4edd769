//! Primal and dual variable sets of one class run

use crate::checkpoint::{DualState, PrimalState};
use crate::Tensor;
use ndarray::Array1;
use rand::Rng;

/// Initial value of every Lagrange multiplier
pub const DUAL_INIT: f32 = 0.001;

/// Trainable constraint variables
///
/// `tau` holds one entry per training sample; `eps` and `w` are
/// single-element tensors. All three receive gradient in the primal step.
#[derive(Debug, Clone)]
pub struct PrimalVariables {
    pub tau: Tensor,
    pub eps: Tensor,
    pub w: Tensor,
}

impl PrimalVariables {
    /// Draw every entry from U[0, 1)
    pub fn init<R: Rng>(n: usize, rng: &mut R) -> Self {
        let tau: Vec<f32> = (0..n).map(|_| rng.random::<f32>()).collect();
        Self {
            tau: Tensor::from_vec(tau, true),
            eps: Tensor::scalar(rng.random::<f32>(), true),
            w: Tensor::scalar(rng.random::<f32>(), true),
        }
    }

    /// Rebuild from a checkpoint when it matches a split of `n` samples
    pub fn from_state(state: &PrimalState, n: usize) -> Option<Self> {
        let usable = state.tau.len() == n
            && state.tau.iter().all(|v| v.is_finite())
            && state.eps.is_finite()
            && state.eps >= 0.0
            && state.w.is_finite();
        usable.then(|| Self {
            tau: Tensor::from_vec(state.tau.clone(), true),
            eps: Tensor::scalar(state.eps, true),
            w: Tensor::scalar(state.w, true),
        })
    }

    pub fn to_state(&self) -> PrimalState {
        PrimalState {
            tau: self.tau.data().to_vec(),
            eps: self.eps.item(),
            w: self.w.item(),
        }
    }

    pub fn len(&self) -> usize {
        self.tau.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tau.is_empty()
    }

    pub fn eps_value(&self) -> f32 {
        self.eps.item()
    }

    pub fn w_value(&self) -> f32 {
        self.w.item()
    }

    /// Project `eps` onto the feasible set `eps >= 0`
    pub fn project_eps(&mut self) {
        self.eps.data_mut().mapv_inplace(|v| v.max(0.0));
    }

    /// Name and value of the first non-finite variable
    pub(crate) fn first_non_finite(&self) -> Option<(&'static str, f32)> {
        [("tau", &self.tau), ("eps", &self.eps), ("w", &self.w)]
            .into_iter()
            .find_map(|(name, t)| {
                t.data()
                    .iter()
                    .find(|v| !v.is_finite())
                    .map(|&v| (name, v))
            })
    }
}

/// Lagrange multipliers
///
/// Plain numeric state: multipliers enter the primal loss as constants and
/// change only in the dual step.
#[derive(Debug, Clone, PartialEq)]
pub struct DualVariables {
    pub lambda: Array1<f32>,
    pub gamma: Array1<f32>,
    pub mu: f32,
}

impl DualVariables {
    pub fn new(n: usize) -> Self {
        Self {
            lambda: Array1::from_elem(n, DUAL_INIT),
            gamma: Array1::from_elem(n, DUAL_INIT),
            mu: DUAL_INIT,
        }
    }

    /// Rebuild from a checkpoint when it matches a split of `n` samples
    pub fn from_state(state: &DualState, n: usize) -> Option<Self> {
        let usable = state.lambda.len() == n
            && state.gamma.len() == n
            && state.mu.is_finite()
            && state.lambda.iter().chain(&state.gamma).all(|v| v.is_finite());
        usable.then(|| Self {
            lambda: Array1::from(state.lambda.clone()),
            gamma: Array1::from(state.gamma.clone()),
            mu: state.mu,
        })
    }

    pub fn to_state(&self) -> DualState {
        DualState {
            lambda: self.lambda.to_vec(),
            gamma: self.gamma.to_vec(),
            mu: self.mu,
        }
    }

    pub fn len(&self) -> usize {
        self.lambda.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lambda.is_empty()
    }

    /// Multipliers seen by the primal loss of sample `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn snapshot(&self, index: usize) -> super::DualSnapshot {
        super::DualSnapshot {
            mu: self.mu,
            lambda_i: self.lambda[index],
            gamma_i: self.gamma[index],
        }
    }

    pub(crate) fn first_non_finite(&self) -> Option<(&'static str, f32)> {
        if !self.mu.is_finite() {
            return Some(("mu", self.mu));
        }
        [("lambda", &self.lambda), ("gamma", &self.gamma)]
            .into_iter()
            .find_map(|(name, a)| a.iter().find(|v| !v.is_finite()).map(|&v| (name, v)))
    }
}
