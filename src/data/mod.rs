//! Datasets, sampling and synthetic data
//!
//! - [`BinaryDataset`]: one class's train or test split
//! - [`MultiLabelDataset`]: multi-label rows reduced one-vs-rest per class
//! - [`CyclicSampler`]: infinite index stream over a split
//! - [`synthetic::generate`]: seeded multi-label generator

mod dataset;
mod sampler;
pub mod synthetic;

pub use dataset::{BinaryDataset, DatasetProvider, MultiLabelDataset, Sample, SplitMultiLabel};
pub use sampler::CyclicSampler;
