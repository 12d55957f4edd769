//! Two heads over one shared ReLU hidden layer

use super::{check_input, ConstrainedModel, Dense, ModelConfig, ModelOutput};
use crate::autograd::relu;
use crate::error::Result;
use crate::Tensor;
use rand::rngs::StdRng;

/// Shared hidden layer feeding a classification head and a score head
///
/// Both heads backpropagate into the same hidden activations.
pub struct MlpTwoHead {
    hidden: Dense,
    classifier: Dense,
    scorer: Dense,
}

impl MlpTwoHead {
    pub fn new(config: &ModelConfig, rng: &mut StdRng) -> Self {
        Self {
            hidden: Dense::new(config.input_dim, config.hidden_units, rng),
            classifier: Dense::new(config.hidden_units, 2, rng),
            scorer: Dense::new(config.hidden_units, 1, rng),
        }
    }
}

impl ConstrainedModel for MlpTwoHead {
    fn name(&self) -> &'static str {
        "MlpTwoHead"
    }

    fn input_dim(&self) -> usize {
        self.hidden.in_dim()
    }

    fn forward(&self, features: &Tensor) -> Result<ModelOutput> {
        check_input(self, features)?;
        let h = relu(&self.hidden.forward(features));
        Ok(ModelOutput {
            logits: self.classifier.forward(&h),
            score: self.scorer.forward(&h),
        })
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut params = self.hidden.named_parameters("hidden");
        params.extend(self.classifier.named_parameters("classifier"));
        params.extend(self.scorer.named_parameters("scorer"));
        params
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
        let mut params = self.hidden.named_parameters_mut("hidden");
        params.extend(self.classifier.named_parameters_mut("classifier"));
        params.extend(self.scorer.named_parameters_mut("scorer"));
        params
    }
}
