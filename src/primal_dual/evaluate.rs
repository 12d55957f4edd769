//! Test-split evaluation of a trained class model

use crate::data::BinaryDataset;
use crate::error::Result;
use crate::models::ConstrainedModel;
use crate::tracking::MetricLogger;
use crate::train::{Accuracy, F1Score, Metric, Precision, Recall};
use crate::Tensor;
use serde::Serialize;

/// Scores of the classification head on one split
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub accuracy: f32,
    pub n_samples: usize,
    pub n_positives: usize,
}

impl Evaluation {
    /// Log every score under `test_<name>` at `epoch`
    pub fn log_to(&self, logger: &mut dyn MetricLogger, epoch: u64) -> Result<()> {
        logger.log(epoch, "test_precision", f64::from(self.precision))?;
        logger.log(epoch, "test_recall", f64::from(self.recall))?;
        logger.log(epoch, "test_f1", f64::from(self.f1))?;
        logger.log(epoch, "test_accuracy", f64::from(self.accuracy))?;
        Ok(())
    }
}

/// Score argmax predictions of `model` against `split`
pub fn evaluate(model: &dyn ConstrainedModel, split: &BinaryDataset) -> Result<Evaluation> {
    let mut predicted = Vec::with_capacity(split.len());
    let mut actual = Vec::with_capacity(split.len());
    for sample in split.iter() {
        let output = model.predict(&Tensor::constant(sample.features.clone()))?;
        predicted.push(f32::from(output.predicted_label()));
        actual.push(f32::from(sample.label));
    }

    let predicted = Tensor::from_vec(predicted, false);
    let actual = Tensor::from_vec(actual, false);

    Ok(Evaluation {
        precision: Precision::default().compute(&predicted, &actual),
        recall: Recall::default().compute(&predicted, &actual),
        f1: F1Score::default().compute(&predicted, &actual),
        accuracy: Accuracy::default().compute(&predicted, &actual),
        n_samples: split.len(),
        n_positives: split.num_positives(),
    })
}
