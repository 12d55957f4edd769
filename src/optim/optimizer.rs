//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Parameters are passed as mutable references so they can stay owned by a
/// model or by the primal variable set.
pub trait Optimizer {
    /// Perform a single optimization step
    ///
    /// Parameters without an accumulated gradient are left unchanged.
    fn step(&mut self, params: &mut [&mut Tensor]);

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}
