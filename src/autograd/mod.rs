//! Tape-based autograd engine
//!
//! Provides reverse-mode automatic differentiation over one-dimensional
//! tensors. Every differentiable operation attaches a [`BackwardOp`] to its
//! output; [`backward`] walks the graph in reverse topological order.
//!
//! ```
//! use entrenar_f1::autograd::{backward, mul, sum, Tensor};
//!
//! let w = Tensor::from_vec(vec![2.0, 3.0], true);
//! let x = Tensor::from_vec(vec![1.0, 4.0], false);
//! let mut y = sum(&mul(&w, &x));
//! backward(&mut y, None);
//!
//! assert_eq!(y.item(), 14.0);
//! assert_eq!(w.grad().unwrap().to_vec(), vec![1.0, 4.0]);
//! ```

mod backward;
mod context;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::{backward, BackwardOp};
pub use context::{is_grad_enabled, no_grad};
pub(crate) use context::tracks_grad;
pub use ops::*;
pub use tensor::Tensor;
