//! Evaluation metrics for binary classification
//!
//! Accuracy, Precision, Recall and F1 over thresholded predictions.

mod classification;
mod trait_def;


pub use classification::{Accuracy, ConfusionCounts, F1Score, Precision, Recall};
pub use trait_def::Metric;
