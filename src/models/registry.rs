//! Static model registry

use super::{ConstrainedModel, LinearTwoHead, MlpTwoHead, ModelConfig};
use crate::error::{Error, Result};
use rand::rngs::StdRng;

type Constructor = fn(&ModelConfig, &mut StdRng) -> Box<dyn ConstrainedModel>;

static REGISTRY: &[(&str, Constructor)] = &[
    ("LinearTwoHead", linear_two_head),
    ("MlpTwoHead", mlp_two_head),
];

fn linear_two_head(config: &ModelConfig, rng: &mut StdRng) -> Box<dyn ConstrainedModel> {
    Box::new(LinearTwoHead::new(config, rng))
}

fn mlp_two_head(config: &ModelConfig, rng: &mut StdRng) -> Box<dyn ConstrainedModel> {
    Box::new(MlpTwoHead::new(config, rng))
}

/// Names accepted by the `model` config key
pub fn registered_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

pub fn is_registered(name: &str) -> bool {
    REGISTRY.iter().any(|(n, _)| *n == name)
}

/// Construct the model registered under `name`
pub fn build_model(
    name: &str,
    config: &ModelConfig,
    rng: &mut StdRng,
) -> Result<Box<dyn ConstrainedModel>> {
    let (_, constructor) = REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| Error::UnknownModel {
            name: name.to_string(),
            available: registered_names().join(", "),
        })?;
    Ok(constructor(config, rng))
}
