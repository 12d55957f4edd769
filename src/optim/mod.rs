//! Optimizers for training the primal variables

mod optimizer;
mod param_groups;
mod sgd;

pub use optimizer::Optimizer;
pub use param_groups::{OptimError, ParamGroups};
pub use sgd::SGD;
