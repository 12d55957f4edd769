//! Fully connected layer over a single feature vector

use crate::autograd::{add, matmul};
use crate::Tensor;
use rand::Rng;

/// `y = W x + b` with `W` stored row-major as `out_dim x in_dim`
pub struct Dense {
    pub weight: Tensor,
    pub bias: Tensor,
    in_dim: usize,
    out_dim: usize,
}

impl Dense {
    /// Uniform initialisation in `[-1/sqrt(in_dim), 1/sqrt(in_dim))`
    pub fn new<R: Rng>(in_dim: usize, out_dim: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (in_dim.max(1) as f32).sqrt();
        let mut sample = |n: usize| -> Vec<f32> {
            (0..n).map(|_| rng.random_range(-bound..bound)).collect()
        };
        let weight = Tensor::from_vec(sample(out_dim * in_dim), true);
        let bias = Tensor::from_vec(sample(out_dim), true);
        Self {
            weight,
            bias,
            in_dim,
            out_dim,
        }
    }

    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        let wx = matmul(&self.weight, x, self.out_dim, self.in_dim, 1);
        add(&wx, &self.bias)
    }

    pub(crate) fn named_parameters<'a>(&'a self, prefix: &str) -> Vec<(String, &'a Tensor)> {
        vec![
            (format!("{prefix}.weight"), &self.weight),
            (format!("{prefix}.bias"), &self.bias),
        ]
    }

    pub(crate) fn named_parameters_mut<'a>(
        &'a mut self,
        prefix: &str,
    ) -> Vec<(String, &'a mut Tensor)> {
        vec![
            (format!("{prefix}.weight"), &mut self.weight),
            (format!("{prefix}.bias"), &mut self.bias),
        ]
    }
}
