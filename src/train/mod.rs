//! Training building blocks
//!
//! - Loss functions ([`CrossEntropyLoss`])
//! - Evaluation metrics (Accuracy, Precision, Recall, F1)
//!
//! The constrained training loop itself lives in [`crate::primal_dual`].

mod loss;
mod metrics;

pub use loss::{one_hot, CrossEntropyLoss, LossFn};
pub use metrics::{Accuracy, ConfusionCounts, F1Score, Metric, Precision, Recall};
