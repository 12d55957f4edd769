//! Seeded synthetic multi-label dataset
//!
//! Bag-of-words style generator: every class has a prior and a distribution
//! over features. A sample draws a Poisson number of distinct classes, then a
//! Poisson number of feature draws from the mixture of its classes'
//! distributions. Feature values are the draw counts.

use super::dataset::{MultiLabelDataset, SplitMultiLabel};
use crate::config::DatasetSpec;
use crate::error::{Error, Result};
use ndarray::Array1;
use rand::Rng;

/// Largest Poisson mean drawn in one Knuth pass
const POISSON_CHUNK: f64 = 30.0;

const MAX_LABEL_DRAWS: usize = 100;

/// Poisson draw, splitting large means into independent chunks
pub fn sample_poisson<R: Rng>(rng: &mut R, mean: f64) -> usize {
    let mut remaining = mean.max(0.0);
    let mut total = 0;
    while remaining > 0.0 {
        let chunk = remaining.min(POISSON_CHUNK);
        total += knuth_poisson(rng, chunk);
        remaining -= chunk;
    }
    total
}

fn knuth_poisson<R: Rng>(rng: &mut R, mean: f64) -> usize {
    let limit = (-mean).exp();
    let mut k = 0;
    let mut p = rng.random::<f64>();
    while p > limit {
        k += 1;
        p *= rng.random::<f64>();
    }
    k
}

/// Index drawn from unnormalised non-negative `weights`
fn sample_weighted<R: Rng>(rng: &mut R, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    let target = rng.random::<f64>() * total;
    let mut acc = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        acc += w;
        if target < acc {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

fn uniform_distribution<R: Rng>(rng: &mut R, len: usize) -> Vec<f64> {
    // Offset keeps every entry strictly positive
    let raw: Vec<f64> = (0..len).map(|_| rng.random::<f64>() + 1e-9).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / total).collect()
}

/// Label count in `1..=n_classes`
///
/// Out-of-range draws are rejected up to `MAX_LABEL_DRAWS` times, after which
/// the last draw is clamped into range.
fn draw_label_count<R: Rng>(rng: &mut R, mean: f64, n_classes: usize) -> usize {
    let mut n = 0;
    for _ in 0..MAX_LABEL_DRAWS {
        n = sample_poisson(rng, mean);
        if (1..=n_classes).contains(&n) {
            return n;
        }
    }
    n.clamp(1, n_classes.max(1))
}

/// Generate `n_train + n_test` samples and split them in that order
///
/// Every sample carries at least one and at most `n_classes` labels.
pub fn generate<R: Rng>(spec: &DatasetSpec, rng: &mut R) -> Result<SplitMultiLabel> {
    if spec.n_classes == 0 || spec.n_features == 0 || spec.doc_length == 0 {
        return Err(Error::ConfigError(format!(
            "synthetic dataset needs n_classes, n_features and doc_length > 0 (got {}, {}, {})",
            spec.n_classes, spec.n_features, spec.doc_length
        )));
    }
    let n_classes = spec.n_classes;
    let n_features = spec.n_features;
    let n_samples = spec.n_train + spec.n_test;

    let class_priors = uniform_distribution(rng, n_classes);
    let feature_given_class: Vec<Vec<f64>> = (0..n_classes)
        .map(|_| uniform_distribution(rng, n_features))
        .collect();

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let n_labels = draw_label_count(rng, spec.mean_n_labels, n_classes);

        let mut row = vec![0u8; n_classes];
        let mut chosen = 0;
        while chosen < n_labels {
            let c = sample_weighted(rng, &class_priors);
            if row[c] == 0 {
                row[c] = 1;
                chosen += 1;
            }
        }

        let mixture: Vec<f64> = (0..n_features)
            .map(|f| {
                row.iter()
                    .enumerate()
                    .filter(|(_, member)| **member == 1)
                    .map(|(c, _)| feature_given_class[c][f])
                    .sum()
            })
            .collect();

        let n_draws = loop {
            let n = sample_poisson(rng, spec.doc_length as f64);
            if n > 0 {
                break n;
            }
        };

        let mut counts = Array1::<f32>::zeros(n_features);
        for _ in 0..n_draws {
            counts[sample_weighted(rng, &mixture)] += 1.0;
        }

        features.push(counts);
        labels.push(row);
    }

    let all = MultiLabelDataset::new(features, labels, n_classes)?;
    let (train, test) = all.split_at(spec.n_train);
    Ok(SplitMultiLabel { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DatasetProvider;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spec() -> DatasetSpec {
        DatasetSpec {
            n_classes: 5,
            n_features: 6,
            n_train: 30,
            n_test: 10,
            mean_n_labels: 2.0,
            doc_length: 20,
        }
    }

    #[test]
    fn test_shapes() {
        let mut rng = StdRng::seed_from_u64(0);
        let data = generate(&spec(), &mut rng).unwrap();
        assert_eq!(data.train.len(), 30);
        assert_eq!(data.test.len(), 10);
        assert_eq!(data.n_classes(), 5);
        assert_eq!(data.n_features(), 6);
    }

    #[test]
    fn test_label_counts_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = generate(&spec(), &mut rng).unwrap();
        for i in 0..data.train.len() {
            let row = data.train.labels(i).unwrap();
            let n: usize = row.iter().map(|&v| usize::from(v)).sum();
            assert!((1..=5).contains(&n), "row {i} has {n} labels");
        }
    }

    #[test]
    fn test_features_are_nonnegative_counts() {
        let mut rng = StdRng::seed_from_u64(2);
        let data = generate(&spec(), &mut rng).unwrap();
        let train = data.train(0).unwrap();
        for sample in train.iter() {
            assert!(sample.features.iter().all(|&v| v >= 0.0 && v.fract() == 0.0));
            assert!(sample.features.sum() >= 1.0);
        }
    }

    #[test]
    fn test_label_mean_above_class_count_terminates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut s = spec();
        s.mean_n_labels = 50.0;
        s.n_train = 5;
        s.n_test = 0;
        let data = generate(&s, &mut rng).unwrap();
        assert_eq!(data.train.len(), 5);
        for i in 0..5 {
            assert_eq!(data.train.labels(i).unwrap(), &[1u8; 5][..]);
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate(&spec(), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate(&spec(), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_poisson_mean() {
        let mut rng = StdRng::seed_from_u64(4);
        let n = 4000;
        let mean: f64 = (0..n).map(|_| sample_poisson(&mut rng, 14.0) as f64).sum::<f64>() / n as f64;
        assert!((mean - 14.0).abs() < 0.5, "mean {mean}");

        let big: f64 = (0..n).map(|_| sample_poisson(&mut rng, 75.0) as f64).sum::<f64>() / n as f64;
        assert!((big - 75.0).abs() < 1.5, "mean {big}");
    }

    #[test]
    fn test_poisson_zero_mean() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(sample_poisson(&mut rng, 0.0), 0);
    }

    #[test]
    fn test_zero_doc_length_rejected() {
        let mut s = spec();
        s.doc_length = 0;
        let err = generate(&s, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
