//! Named parameter groups, each with its own optimizer

use super::{Optimizer, SGD};
use crate::Tensor;
use thiserror::Error;

/// Errors raised by [`ParamGroups`]
#[derive(Debug, Error, PartialEq)]
pub enum OptimError {
    #[error("Unknown parameter group '{0}'")]
    UnknownGroup(String),

    #[error("Parameter group '{0}' registered twice")]
    DuplicateGroup(String),

    #[error("Invalid learning rate {lr} for group '{group}': must be finite and non-negative")]
    InvalidLearningRate { group: String, lr: f32 },
}

/// Ordered set of named optimizer groups
///
/// Each group owns its optimizer state; the parameters themselves are passed
/// in on every call.
#[derive(Default)]
pub struct ParamGroups {
    groups: Vec<(String, Box<dyn Optimizer>)>,
}

impl ParamGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group backed by plain SGD at `lr`
    pub fn with_sgd(self, name: &str, lr: f32) -> Result<Self, OptimError> {
        self.with_group(name, lr, Box::new(SGD::plain(lr)))
    }

    /// Register a group with an arbitrary optimizer
    pub fn with_group(
        mut self,
        name: &str,
        lr: f32,
        optimizer: Box<dyn Optimizer>,
    ) -> Result<Self, OptimError> {
        if !lr.is_finite() || lr < 0.0 {
            return Err(OptimError::InvalidLearningRate {
                group: name.to_string(),
                lr,
            });
        }
        if self.position(name).is_some() {
            return Err(OptimError::DuplicateGroup(name.to_string()));
        }
        self.groups.push((name.to_string(), optimizer));
        Ok(self)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|(n, _)| n == name)
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut Box<dyn Optimizer>, OptimError> {
        let idx = self
            .position(name)
            .ok_or_else(|| OptimError::UnknownGroup(name.to_string()))?;
        Ok(&mut self.groups[idx].1)
    }

    /// Step one group's optimizer over `params`
    pub fn step(&mut self, name: &str, params: &mut [&mut Tensor]) -> Result<(), OptimError> {
        self.group_mut(name)?.step(params);
        Ok(())
    }

    /// Clear the gradients of one group's parameters
    pub fn zero_grad(&mut self, name: &str, params: &mut [&mut Tensor]) -> Result<(), OptimError> {
        self.group_mut(name)?.zero_grad(params);
        Ok(())
    }

    pub fn lr(&self, name: &str) -> Result<f32, OptimError> {
        self.position(name)
            .map(|idx| self.groups[idx].1.lr())
            .ok_or_else(|| OptimError::UnknownGroup(name.to_string()))
    }

    pub fn set_lr(&mut self, name: &str, lr: f32) -> Result<(), OptimError> {
        self.group_mut(name)?.set_lr(lr);
        Ok(())
    }

    /// Group names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
