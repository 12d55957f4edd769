//! Everything one class run owns

use super::{DualVariables, PrimalRates, PrimalVariables};
use crate::checkpoint::{self, CheckpointStore, ScheduleProgress};
use crate::data::{BinaryDataset, CyclicSampler};
use crate::error::{Error, Result};
use crate::models::{build_model, ConstrainedModel, ModelConfig};
use crate::optim::ParamGroups;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Model, constraint variables, optimizer and sampler of one class
///
/// Nothing in here is shared with another class.
pub struct ClassRunContext {
    pub class: usize,
    pub model: Box<dyn ConstrainedModel>,
    pub primal: PrimalVariables,
    pub dual: DualVariables,
    pub optimizer: ParamGroups,
    pub sampler: CyclicSampler,
    pub train: BinaryDataset,
    /// Positive samples in `train`
    pub n_positives: usize,
    /// Scheduler counters to continue from
    pub progress: ScheduleProgress,
}

/// How a class run is set up
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSettings {
    pub model: String,
    pub model_config: ModelConfig,
    pub rates: PrimalRates,
    pub seed: u64,
}

impl ClassRunContext {
    /// Assemble a context around an already built model
    pub fn new(
        class: usize,
        model: Box<dyn ConstrainedModel>,
        primal: PrimalVariables,
        dual: DualVariables,
        optimizer: ParamGroups,
        train: BinaryDataset,
    ) -> Result<Self> {
        if train.is_empty() {
            return Err(Error::EmptyDataset(class));
        }
        if primal.len() != train.len() || dual.len() != train.len() {
            return Err(Error::ShapeMismatch {
                context: format!("class {class} constraint variables"),
                expected: train.len(),
                actual: primal.len().min(dual.len()),
            });
        }
        Ok(Self {
            class,
            model,
            primal,
            dual,
            optimizer,
            sampler: CyclicSampler::new(train.len()),
            n_positives: train.num_positives(),
            progress: ScheduleProgress::default(),
            train,
        })
    }

    /// Build model and variables from a fresh seed, then apply the class's
    /// checkpoint if the store has one
    ///
    /// Returns the context and the outer iteration to start from. Primal and
    /// dual state from the checkpoint is used only when it fits the split;
    /// otherwise both start fresh while the restored weights are kept.
    pub fn initialize(
        class: usize,
        settings: &ContextSettings,
        train: BinaryDataset,
        checkpoints: &dyn CheckpointStore,
    ) -> Result<(Self, usize)> {
        if train.is_empty() {
            return Err(Error::EmptyDataset(class));
        }
        let n = train.len();
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let mut model = build_model(&settings.model, &settings.model_config, &mut rng)?;
        let fresh_primal = PrimalVariables::init(n, &mut rng);

        let restored = checkpoint::restore(checkpoints, class, model.as_mut())?;
        let primal = match restored.primal.as_ref() {
            None => fresh_primal,
            Some(state) => PrimalVariables::from_state(state, n).unwrap_or_else(|| {
                tracing::warn!(class, "checkpointed primal state does not fit the split, reinitialising");
                fresh_primal
            }),
        };
        let dual = match restored.dual.as_ref() {
            None => DualVariables::new(n),
            Some(state) => DualVariables::from_state(state, n).unwrap_or_else(|| {
                tracing::warn!(class, "checkpointed dual state does not fit the split, reinitialising");
                DualVariables::new(n)
            }),
        };

        if restored.start_outer > 0 {
            tracing::info!(class, start_outer = restored.start_outer, "resuming from checkpoint");
        }

        let mut context = Self::new(class, model, primal, dual, settings.rates.optimizer()?, train)?;
        context.progress = restored.progress;
        context.sampler.seek(restored.progress.global_step);
        Ok((context, restored.start_outer))
    }
}
