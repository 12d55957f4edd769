//! Binary and multi-label datasets

use crate::error::{Error, Result};
use ndarray::Array1;

/// One training example of a one-vs-rest problem
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: Array1<f32>,
    /// 1 for the positive class, 0 for the rest
    pub label: u8,
}

impl Sample {
    pub fn new(features: Vec<f32>, label: u8) -> Self {
        Self {
            features: Array1::from(features),
            label,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// Ordered, indexable binary dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinaryDataset {
    samples: Vec<Sample>,
}

impl BinaryDataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Number of samples labelled 1
    pub fn num_positives(&self) -> usize {
        self.samples.iter().filter(|s| s.is_positive()).count()
    }

    /// Feature length of the first sample, 0 when empty
    pub fn n_features(&self) -> usize {
        self.samples.first().map_or(0, |s| s.features.len())
    }
}

/// Samples with a 0/1 membership row over `n_classes` labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiLabelDataset {
    features: Vec<Array1<f32>>,
    labels: Vec<Vec<u8>>,
    n_classes: usize,
}

impl MultiLabelDataset {
    /// Build from parallel feature and label rows
    ///
    /// # Errors
    ///
    /// Fails when row counts differ, a label row does not have `n_classes`
    /// entries, or feature rows disagree in length.
    pub fn new(features: Vec<Array1<f32>>, labels: Vec<Vec<u8>>, n_classes: usize) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(Error::ShapeMismatch {
                context: "multi-label rows".into(),
                expected: features.len(),
                actual: labels.len(),
            });
        }
        if let Some(row) = labels.iter().find(|row| row.len() != n_classes) {
            return Err(Error::ShapeMismatch {
                context: "label row".into(),
                expected: n_classes,
                actual: row.len(),
            });
        }
        if let Some(first) = features.first() {
            if let Some(row) = features.iter().find(|f| f.len() != first.len()) {
                return Err(Error::ShapeMismatch {
                    context: "feature row".into(),
                    expected: first.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self {
            features,
            labels,
            n_classes,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Array1::len)
    }

    pub fn labels(&self, index: usize) -> Option<&[u8]> {
        self.labels.get(index).map(Vec::as_slice)
    }

    /// Reduce to "class `class` vs. rest"
    pub fn one_vs_rest(&self, class: usize) -> Result<BinaryDataset> {
        if class >= self.n_classes {
            return Err(Error::ClassOutOfRange {
                class,
                n_classes: self.n_classes,
            });
        }
        let samples = self
            .features
            .iter()
            .zip(&self.labels)
            .map(|(x, row)| Sample {
                features: x.clone(),
                label: row[class],
            })
            .collect();
        Ok(BinaryDataset::new(samples))
    }

    /// Split into the first `n` rows and the remainder
    pub fn split_at(self, n: usize) -> (Self, Self) {
        let n = n.min(self.len());
        let mut features = self.features;
        let mut labels = self.labels;
        let rest_features = features.split_off(n);
        let rest_labels = labels.split_off(n);
        (
            Self {
                features,
                labels,
                n_classes: self.n_classes,
            },
            Self {
                features: rest_features,
                labels: rest_labels,
                n_classes: self.n_classes,
            },
        )
    }
}

/// Source of per-class train/test splits
pub trait DatasetProvider {
    fn n_classes(&self) -> usize;

    fn n_features(&self) -> usize;

    /// Training split of class `class` vs. rest
    fn train(&self, class: usize) -> Result<BinaryDataset>;

    /// Test split of class `class` vs. rest
    fn test(&self, class: usize) -> Result<BinaryDataset>;
}

/// Multi-label train/test pair reduced one-vs-rest on demand
#[derive(Debug, Clone, PartialEq)]
pub struct SplitMultiLabel {
    pub train: MultiLabelDataset,
    pub test: MultiLabelDataset,
}

impl DatasetProvider for SplitMultiLabel {
    fn n_classes(&self) -> usize {
        self.train.n_classes()
    }

    fn n_features(&self) -> usize {
        self.train.n_features()
    }

    fn train(&self, class: usize) -> Result<BinaryDataset> {
        self.train.one_vs_rest(class)
    }

    fn test(&self, class: usize) -> Result<BinaryDataset> {
        self.test.one_vs_rest(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn small() -> MultiLabelDataset {
        MultiLabelDataset::new(
            vec![arr1(&[1.0, 0.0]), arr1(&[0.0, 1.0]), arr1(&[1.0, 1.0])],
            vec![vec![1, 0], vec![0, 1], vec![1, 1]],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_one_vs_rest_labels() {
        let data = small();
        let c0 = data.one_vs_rest(0).unwrap();
        let labels: Vec<u8> = c0.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec![1, 0, 1]);
        assert_eq!(c0.num_positives(), 2);
        assert_eq!(c0.n_features(), 2);

        let c1 = data.one_vs_rest(1).unwrap();
        assert_eq!(c1.num_positives(), 2);
        assert_eq!(c1.get(1).map(|s| s.label), Some(1));
    }

    #[test]
    fn test_class_out_of_range() {
        let err = small().one_vs_rest(2).unwrap_err();
        assert!(matches!(
            err,
            Error::ClassOutOfRange {
                class: 2,
                n_classes: 2
            }
        ));
    }

    #[test]
    fn test_inconsistent_rows_rejected() {
        assert!(MultiLabelDataset::new(vec![arr1(&[1.0])], vec![], 1).is_err());
        assert!(MultiLabelDataset::new(vec![arr1(&[1.0])], vec![vec![1, 0]], 1).is_err());
        assert!(MultiLabelDataset::new(
            vec![arr1(&[1.0]), arr1(&[1.0, 2.0])],
            vec![vec![1], vec![0]],
            1
        )
        .is_err());
    }

    #[test]
    fn test_split_at() {
        let (train, test) = small().split_at(2);
        assert_eq!(train.len(), 2);
        assert_eq!(test.len(), 1);
        assert_eq!(test.labels(0), Some(&[1u8, 1][..]));

        let (all, none) = small().split_at(10);
        assert_eq!(all.len(), 3);
        assert!(none.is_empty());
    }

    #[test]
    fn test_split_provider() {
        let (train, test) = small().split_at(2);
        let provider = SplitMultiLabel { train, test };
        assert_eq!(provider.n_classes(), 2);
        assert_eq!(provider.n_features(), 2);
        assert_eq!(provider.train(0).unwrap().len(), 2);
        assert_eq!(provider.test(1).unwrap().num_positives(), 1);
    }

    #[test]
    fn test_empty_binary_dataset() {
        let data = BinaryDataset::default();
        assert!(data.is_empty());
        assert_eq!(data.n_features(), 0);
        assert!(data.get(0).is_none());
    }
}
