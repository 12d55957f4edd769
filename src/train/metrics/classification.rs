//! Classification metrics: Accuracy, Precision, Recall, F1
//!
//! Predictions are thresholded into hard labels, then scored from a
//! [`ConfusionCounts`] tally against targets thresholded at 0.5.

use crate::Tensor;

use super::Metric;

/// True/false positive/negative tally for a binary problem
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    /// Tally hard predictions against hard labels
    pub fn from_labels(predicted: &[bool], actual: &[bool]) -> Self {
        let mut counts = Self::default();
        for (&p, &t) in predicted.iter().zip(actual.iter()) {
            counts.record(p, t);
        }
        counts
    }

    /// Tally continuous predictions at `threshold` against 0/1 targets
    pub fn from_tensors(predictions: &Tensor, targets: &Tensor, threshold: f32) -> Self {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );
        let mut counts = Self::default();
        for (&p, &t) in predictions.data().iter().zip(targets.data().iter()) {
            counts.record(p >= threshold, t >= 0.5);
        }
        counts
    }

    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Fraction of correct predictions; 0 when empty
    pub fn accuracy(&self) -> f32 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// TP / predicted positives; 0 when nothing is predicted positive
    pub fn precision(&self) -> f32 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / actual positives; 0 when there are no positives
    pub fn recall(&self) -> f32 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall; 0 when both are 0
    pub fn f1(&self) -> f32 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            return 0.0;
        }
        2.0 * (precision * recall) / (precision + recall)
    }
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

/// Accuracy metric for binary classification
///
/// # Example
///
/// ```
/// use entrenar_f1::train::{Accuracy, Metric};
/// use entrenar_f1::Tensor;
///
/// let metric = Accuracy::new(0.5);
/// let pred = Tensor::from_vec(vec![0.9, 0.2, 0.8], false);
/// let target = Tensor::from_vec(vec![1.0, 0.0, 1.0], false);
///
/// assert_eq!(metric.compute(&pred, &target), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Accuracy {
    pub(crate) threshold: f32,
}

impl Accuracy {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Accuracy {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        ConfusionCounts::from_tensors(predictions, targets, self.threshold).accuracy()
    }

    fn name(&self) -> &'static str {
        "Accuracy"
    }
}

/// Precision metric (true positives / predicted positives)
///
/// # Example
///
/// ```
/// use entrenar_f1::train::{Precision, Metric};
/// use entrenar_f1::Tensor;
///
/// let metric = Precision::new(0.5);
/// let pred = Tensor::from_vec(vec![0.9, 0.8, 0.2], false);
/// let target = Tensor::from_vec(vec![1.0, 0.0, 0.0], false);
///
/// assert_eq!(metric.compute(&pred, &target), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Precision {
    pub(crate) threshold: f32,
}

impl Precision {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Precision {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        ConfusionCounts::from_tensors(predictions, targets, self.threshold).precision()
    }

    fn name(&self) -> &'static str {
        "Precision"
    }
}

/// Recall metric (true positives / actual positives)
#[derive(Debug, Clone)]
pub struct Recall {
    pub(crate) threshold: f32,
}

impl Recall {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Recall {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Recall {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        ConfusionCounts::from_tensors(predictions, targets, self.threshold).recall()
    }

    fn name(&self) -> &'static str {
        "Recall"
    }
}

/// F1 Score (harmonic mean of precision and recall)
///
/// F1 = 2 * (precision * recall) / (precision + recall)
#[derive(Debug, Clone)]
pub struct F1Score {
    pub(crate) threshold: f32,
}

impl F1Score {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for F1Score {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for F1Score {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        ConfusionCounts::from_tensors(predictions, targets, self.threshold).f1()
    }

    fn name(&self) -> &'static str {
        "F1"
    }
}
