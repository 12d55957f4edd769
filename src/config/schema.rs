//! YAML schema for primal-dual training runs
//!
//! Required keys keep their on-disk spelling (`"learning rate"`,
//! `"stats folder"`), so existing run configs load unchanged.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete primal-dual training specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimalDualSpec {
    /// Total outer iterations (a resumed run continues from its checkpoint)
    pub n_outer: usize,

    /// Primal steps per outer iteration
    pub n_inner: usize,

    /// Learning rate of the model parameter group
    #[serde(rename = "learning rate")]
    pub learning_rate: f32,

    /// Learning rate of `tau`
    pub eta_tau: f32,

    /// Learning rate of `eps`
    pub eta_eps: f32,

    /// Learning rate of `w`
    pub eta_w: f32,

    /// Dual step size of `lambda`
    pub eta_lamb: f32,

    /// Dual step size of `gamma`
    pub eta_gamma: f32,

    /// Dual step size of `mu`
    pub eta_mu: f32,

    /// Weight of the Lagrangian term in the primal loss
    pub beta: f32,

    /// Root directory for per-class metric files
    #[serde(rename = "stats folder")]
    pub stats_folder: PathBuf,

    /// Registered model name
    pub model: String,

    /// Seed for initialisation and synthetic data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Hidden layer width for models that have one
    #[serde(rename = "hidden units", default = "default_hidden_units")]
    pub hidden_units: usize,

    /// Root directory for per-class checkpoints; no checkpointing when absent
    #[serde(
        rename = "checkpoint folder",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub checkpoint_folder: Option<PathBuf>,

    /// Synthetic dataset shape
    #[serde(default)]
    pub dataset: DatasetSpec,
}

/// Shape of the synthetic multi-label dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    #[serde(default = "default_n_classes")]
    pub n_classes: usize,

    #[serde(default = "default_n_features")]
    pub n_features: usize,

    #[serde(default = "default_n_train")]
    pub n_train: usize,

    #[serde(default = "default_n_test")]
    pub n_test: usize,

    /// Mean of the Poisson draw for the number of labels per sample
    #[serde(default = "default_mean_n_labels")]
    pub mean_n_labels: f64,

    /// Feature draws per sample
    #[serde(default = "default_doc_length")]
    pub doc_length: usize,
}

impl Default for DatasetSpec {
    fn default() -> Self {
        Self {
            n_classes: default_n_classes(),
            n_features: default_n_features(),
            n_train: default_n_train(),
            n_test: default_n_test(),
            mean_n_labels: default_mean_n_labels(),
            doc_length: default_doc_length(),
        }
    }
}

/// Seed used when neither the config nor the command line sets one
pub const DEFAULT_SEED: u64 = 42;

impl PrimalDualSpec {
    /// Effective seed
    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }
}

fn default_hidden_units() -> usize {
    16
}

fn default_n_classes() -> usize {
    20
}

fn default_n_features() -> usize {
    20
}

fn default_n_train() -> usize {
    100
}

fn default_n_test() -> usize {
    100
}

fn default_mean_n_labels() -> f64 {
    14.0
}

fn default_doc_length() -> usize {
    50
}
