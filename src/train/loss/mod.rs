//! Loss functions for training
//!
//! - [`CrossEntropyLoss`] - classification term of the primal objective

mod cross_entropy;
mod traits;

pub use cross_entropy::{one_hot, CrossEntropyLoss};
pub use traits::LossFn;
