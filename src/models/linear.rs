//! Two linear heads directly over the features

use super::{check_input, ConstrainedModel, Dense, ModelConfig, ModelOutput};
use crate::error::Result;
use crate::Tensor;
use rand::rngs::StdRng;

/// Linear classification head (2 logits) and linear constraint score
pub struct LinearTwoHead {
    classifier: Dense,
    scorer: Dense,
}

impl LinearTwoHead {
    pub fn new(config: &ModelConfig, rng: &mut StdRng) -> Self {
        Self {
            classifier: Dense::new(config.input_dim, 2, rng),
            scorer: Dense::new(config.input_dim, 1, rng),
        }
    }
}

impl ConstrainedModel for LinearTwoHead {
    fn name(&self) -> &'static str {
        "LinearTwoHead"
    }

    fn input_dim(&self) -> usize {
        self.classifier.in_dim()
    }

    fn forward(&self, features: &Tensor) -> Result<ModelOutput> {
        check_input(self, features)?;
        Ok(ModelOutput {
            logits: self.classifier.forward(features),
            score: self.scorer.forward(features),
        })
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut params = self.classifier.named_parameters("classifier");
        params.extend(self.scorer.named_parameters("scorer"));
        params
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
        let mut params = self.classifier.named_parameters_mut("classifier");
        params.extend(self.scorer.named_parameters_mut("scorer"));
        params
    }
}
