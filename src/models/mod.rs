//! Reference models for constrained training
//!
//! Every model maps one feature vector to a two-logit classification output
//! and a scalar constraint score. Models are looked up by name in a static
//! registry.

mod dense;
mod linear;
mod mlp;
mod registry;

pub use dense::Dense;
pub use linear::LinearTwoHead;
pub use mlp::MlpTwoHead;
pub use registry::{build_model, is_registered, registered_names};

use crate::autograd::no_grad;
use crate::error::{Error, Result};
use crate::Tensor;
use std::collections::BTreeMap;

/// Construction parameters shared by all registered models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    pub input_dim: usize,
    pub hidden_units: usize,
}

/// Outputs of one forward pass
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Two logits: index 0 is the rest class, index 1 the positive class
    pub logits: Tensor,
    /// Single-element constraint score
    pub score: Tensor,
}

impl ModelOutput {
    /// Hard decision from the classification head (ties go to the rest class)
    pub fn predicted_label(&self) -> u8 {
        let logits = self.logits.data();
        u8::from(logits[1] > logits[0])
    }
}

/// A model trained under the primal-dual objective
pub trait ConstrainedModel {
    /// Registry name
    fn name(&self) -> &'static str;

    /// Expected feature vector length
    fn input_dim(&self) -> usize;

    /// Forward pass recording gradients
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] when `features` does not have
    /// [`input_dim`](ConstrainedModel::input_dim) elements.
    fn forward(&self, features: &Tensor) -> Result<ModelOutput>;

    /// Parameters with stable names, in a fixed order
    fn named_parameters(&self) -> Vec<(String, &Tensor)>;

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)>;

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.named_parameters_mut()
            .into_iter()
            .map(|(_, t)| t)
            .collect()
    }

    /// Forward pass without recording gradients
    fn predict(&self, features: &Tensor) -> Result<ModelOutput> {
        no_grad(|| self.forward(features))
    }

    fn num_parameters(&self) -> usize {
        self.named_parameters().iter().map(|(_, t)| t.len()).sum()
    }
}

pub(crate) fn check_input(model: &dyn ConstrainedModel, features: &Tensor) -> Result<()> {
    if features.len() != model.input_dim() {
        return Err(Error::ShapeMismatch {
            context: format!("{} forward", model.name()),
            expected: model.input_dim(),
            actual: features.len(),
        });
    }
    Ok(())
}

/// Copy of every parameter keyed by name
pub fn parameter_snapshot(model: &dyn ConstrainedModel) -> BTreeMap<String, Vec<f32>> {
    model
        .named_parameters()
        .into_iter()
        .map(|(name, t)| (name, t.data().to_vec()))
        .collect()
}

/// Overwrite parameters from a snapshot
///
/// Every parameter must be present with its exact length; on error the model
/// is left untouched.
pub fn load_parameters(
    model: &mut dyn ConstrainedModel,
    snapshot: &BTreeMap<String, Vec<f32>>,
) -> Result<()> {
    for (name, tensor) in model.named_parameters() {
        match snapshot.get(&name) {
            Some(values) if values.len() == tensor.len() => {}
            Some(values) => {
                return Err(Error::Checkpoint(format!(
                    "parameter '{name}' has {} values, model expects {}",
                    values.len(),
                    tensor.len()
                )))
            }
            None => return Err(Error::Checkpoint(format!("parameter '{name}' missing"))),
        }
    }

    for (name, tensor) in model.named_parameters_mut() {
        if let Some(values) = snapshot.get(&name) {
            tensor
                .data_mut()
                .iter_mut()
                .zip(values)
                .for_each(|(d, &v)| *d = v);
        }
    }
    Ok(())
}
