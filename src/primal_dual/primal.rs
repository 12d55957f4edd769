//! One stochastic gradient step on the primal variables

use super::{lagrangian_term, DualVariables, PrimalVariables};
use crate::autograd::{add, backward, scale, select};
use crate::data::Sample;
use crate::error::{Error, Result};
use crate::models::ConstrainedModel;
use crate::optim::ParamGroups;
use crate::train::{one_hot, CrossEntropyLoss, LossFn};
use crate::Tensor;

/// Learning rates of the four primal groups
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimalRates {
    pub model: f32,
    pub tau: f32,
    pub eps: f32,
    pub w: f32,
}

impl PrimalRates {
    /// Joint optimizer with one plain SGD group per primal variable
    pub fn optimizer(&self) -> Result<ParamGroups> {
        Ok(ParamGroups::new()
            .with_sgd("model", self.model)?
            .with_sgd("tau", self.tau)?
            .with_sgd("eps", self.eps)?
            .with_sgd("w", self.w)?)
    }
}

/// Where in the schedule a step runs; carried into divergence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepLocation {
    pub outer: usize,
    pub step: usize,
}

/// Result of one primal step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Sample index the step trained on
    pub index: usize,
    /// `t1 + beta * t2`
    pub loss: f32,
    pub t1: f32,
    pub t2: f32,
    /// `eps` after the optimizer update, before projection
    pub eps_before_projection: f32,
}

/// Train on sample `index` once
///
/// Runs the forward pass, backpropagates `t1 + beta * t2`, steps every
/// optimizer group, clears gradients and projects `eps` onto `eps >= 0`.
/// Dual variables are only read.
#[allow(clippy::too_many_arguments)]
pub fn primal_step(
    model: &mut dyn ConstrainedModel,
    primal: &mut PrimalVariables,
    dual: &DualVariables,
    optimizer: &mut ParamGroups,
    sample: &Sample,
    index: usize,
    n_positives: usize,
    beta: f32,
    location: StepLocation,
) -> Result<StepOutcome> {
    if index >= primal.len() || index >= dual.len() {
        return Err(Error::ShapeMismatch {
            context: "primal step index".into(),
            expected: primal.len().min(dual.len()),
            actual: index + 1,
        });
    }

    let features = Tensor::constant(sample.features.clone());
    let output = model.forward(&features)?;

    let t1 = CrossEntropyLoss.forward(&output.logits, &one_hot(usize::from(sample.label), 2));
    let t2 = lagrangian_term(
        sample.label,
        n_positives,
        &output.score,
        &select(&primal.tau, index),
        &primal.eps,
        &primal.w,
        dual.snapshot(index),
    );
    let mut loss = add(&t1, &scale(&t2, beta));

    let outcome = StepOutcome {
        index,
        loss: loss.item(),
        t1: t1.item(),
        t2: t2.item(),
        eps_before_projection: f32::NAN,
    };
    if !outcome.loss.is_finite() {
        return Err(diverged("loss", outcome.loss, location));
    }

    backward(&mut loss, None);

    optimizer.step("model", &mut model.parameters_mut())?;
    optimizer.step("tau", &mut [&mut primal.tau])?;
    optimizer.step("eps", &mut [&mut primal.eps])?;
    optimizer.step("w", &mut [&mut primal.w])?;

    optimizer.zero_grad("model", &mut model.parameters_mut())?;
    optimizer.zero_grad("tau", &mut [&mut primal.tau])?;
    optimizer.zero_grad("eps", &mut [&mut primal.eps])?;
    optimizer.zero_grad("w", &mut [&mut primal.w])?;

    // f32::max drops NaN, so finiteness is checked before projecting
    if let Some((name, value)) = primal.first_non_finite() {
        return Err(diverged(name, value, location));
    }
    for (name, param) in model.named_parameters() {
        if let Some(&value) = param.data().iter().find(|v| !v.is_finite()) {
            return Err(diverged(&name, value, location));
        }
    }

    let eps_before_projection = primal.eps_value();
    primal.project_eps();

    Ok(StepOutcome {
        eps_before_projection,
        ..outcome
    })
}

fn diverged(quantity: &str, value: f32, location: StepLocation) -> Error {
    Error::NumericDivergence {
        quantity: quantity.to_string(),
        value,
        phase: "primal",
        outer: location.outer,
        step: location.step,
    }
}
