//! Autograd operations with backward passes

mod activations;
mod basic;
mod matmul;

pub use activations::{relu, softmax};
pub use basic::{add, add_scalar, mul, scale, select, sub, sum};
pub use matmul::{matmul, matmul_compute, transpose};
