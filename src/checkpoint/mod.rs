//! Per-class checkpoints
//!
//! A checkpoint captures model weights, the last completed outer iteration
//! and the primal/dual state of one class run. It is written after every dual
//! phase. On resume the model weights are always restored; primal/dual state
//! is only reused when it matches the current training split.

mod store;

pub use store::{CheckpointStore, InMemoryCheckpointStore, JsonCheckpointStore, NullCheckpointStore};

use crate::error::{Error, Result};
use crate::models::{load_parameters, ConstrainedModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Information about a stored parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (e.g. "classifier.weight")
    pub name: String,
    pub len: usize,
}

/// Saved values of `tau`, `eps` and `w`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimalState {
    pub tau: Vec<f32>,
    pub eps: f32,
    pub w: f32,
}

/// Saved values of `lambda`, `gamma` and `mu`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualState {
    pub lambda: Vec<f32>,
    pub gamma: Vec<f32>,
    pub mu: f32,
}

/// Scheduler counters at the end of the checkpointed outer iteration
///
/// Running sums cover the steps since the last epoch emission, so a resumed
/// run emits the same epoch means as an uninterrupted one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleProgress {
    /// Epoch emissions so far
    pub epoch: u64,
    /// Primal steps taken so far
    pub global_step: usize,
    pub loss_sum: f64,
    pub t1_sum: f64,
    pub t2_sum: f64,
    /// Steps folded into the running sums
    pub pending_steps: usize,
}

/// Serializable state of one class run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub class: usize,
    /// Registry name of the model
    pub model: String,
    /// Zero-based index of the last completed outer iteration
    pub last_outer: usize,
    pub parameters: Vec<ParameterInfo>,
    /// Flattened parameter data in `parameters` order
    pub data: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primal: Option<PrimalState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dual: Option<DualState>,
    #[serde(default)]
    pub progress: ScheduleProgress,
}

impl Checkpoint {
    /// Capture the model's current parameters
    pub fn capture(
        class: usize,
        last_outer: usize,
        model: &dyn ConstrainedModel,
        primal: Option<PrimalState>,
        dual: Option<DualState>,
    ) -> Self {
        let mut data = Vec::new();
        let parameters = model
            .named_parameters()
            .into_iter()
            .map(|(name, tensor)| {
                data.extend(tensor.data().iter().copied());
                ParameterInfo {
                    name,
                    len: tensor.len(),
                }
            })
            .collect();
        Self {
            class,
            model: model.name().to_string(),
            last_outer,
            parameters,
            data,
            primal,
            dual,
            progress: ScheduleProgress::default(),
        }
    }

    /// Attach the scheduler counters
    pub fn with_progress(mut self, progress: ScheduleProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Outer iteration a resumed run starts from
    pub fn next_outer(&self) -> usize {
        self.last_outer + 1
    }

    /// Parameter values keyed by name
    pub fn parameter_map(&self) -> Result<BTreeMap<String, Vec<f32>>> {
        let expected: usize = self.parameters.iter().map(|p| p.len).sum();
        if expected != self.data.len() {
            return Err(Error::Checkpoint(format!(
                "class {} checkpoint holds {} values, parameter table describes {}",
                self.class,
                self.data.len(),
                expected
            )));
        }
        let mut offset = 0;
        Ok(self
            .parameters
            .iter()
            .map(|p| {
                let values = self.data[offset..offset + p.len].to_vec();
                offset += p.len;
                (p.name.clone(), values)
            })
            .collect())
    }
}

/// What a resumed class run starts from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Restored {
    /// First outer iteration to run (0 when no checkpoint exists)
    pub start_outer: usize,
    pub primal: Option<PrimalState>,
    pub dual: Option<DualState>,
    pub progress: ScheduleProgress,
}

/// Restore `model` from the class's checkpoint, if any
///
/// Model weights are written into `model`; primal/dual state is handed back
/// for the caller to validate against the training split.
pub fn restore(
    store: &dyn CheckpointStore,
    class: usize,
    model: &mut dyn ConstrainedModel,
) -> Result<Restored> {
    let Some(checkpoint) = store.load(class)? else {
        return Ok(Restored::default());
    };

    if checkpoint.model != model.name() {
        return Err(Error::Checkpoint(format!(
            "class {class} checkpoint was written by model '{}', current model is '{}'",
            checkpoint.model,
            model.name()
        )));
    }

    load_parameters(model, &checkpoint.parameter_map()?)?;

    Ok(Restored {
        start_outer: checkpoint.next_outer(),
        primal: checkpoint.primal,
        dual: checkpoint.dual,
        progress: checkpoint.progress,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{build_model, parameter_snapshot, ModelConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model(seed: u64) -> Box<dyn ConstrainedModel> {
        let config = ModelConfig {
            input_dim: 2,
            hidden_units: 3,
        };
        build_model("MlpTwoHead", &config, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_restore_without_checkpoint_starts_at_zero() {
        let store = InMemoryCheckpointStore::new();
        let mut m = model(0);
        let restored = restore(&store, 0, m.as_mut()).unwrap();
        assert_eq!(restored, Restored::default());
    }

    #[test]
    fn test_restore_writes_weights_and_next_outer() {
        let source = model(1);
        let mut store = InMemoryCheckpointStore::new();
        let dual = DualState {
            lambda: vec![0.1; 4],
            gamma: vec![0.2; 4],
            mu: 0.3,
        };
        store
            .save(&Checkpoint::capture(2, 4, source.as_ref(), None, Some(dual.clone())))
            .unwrap();

        let mut target = model(2);
        let restored = restore(&store, 2, target.as_mut()).unwrap();

        assert_eq!(restored.start_outer, 5);
        assert_eq!(restored.dual, Some(dual));
        assert!(restored.primal.is_none());
        assert_eq!(
            parameter_snapshot(target.as_ref()),
            parameter_snapshot(source.as_ref())
        );
    }

    #[test]
    fn test_restore_returns_progress() {
        let progress = ScheduleProgress {
            epoch: 3,
            global_step: 14,
            loss_sum: 1.5,
            t1_sum: 1.0,
            t2_sum: 1.0,
            pending_steps: 2,
        };
        let mut store = InMemoryCheckpointStore::new();
        store
            .save(&Checkpoint::capture(0, 1, model(0).as_ref(), None, None).with_progress(progress))
            .unwrap();

        let restored = restore(&store, 0, model(1).as_mut()).unwrap();
        assert_eq!(restored.progress, progress);
    }

    #[test]
    fn test_checkpoint_without_progress_field_loads_as_fresh() {
        let mut value =
            serde_json::to_value(Checkpoint::capture(0, 0, model(0).as_ref(), None, None)).unwrap();
        value.as_object_mut().unwrap().remove("progress");
        let checkpoint: Checkpoint = serde_json::from_value(value).unwrap();
        assert_eq!(checkpoint.progress, ScheduleProgress::default());
    }

    #[test]
    fn test_restore_rejects_other_model() {
        let config = ModelConfig {
            input_dim: 2,
            hidden_units: 3,
        };
        let linear = build_model("LinearTwoHead", &config, &mut StdRng::seed_from_u64(0)).unwrap();
        let mut store = InMemoryCheckpointStore::new();
        store
            .save(&Checkpoint::capture(0, 0, linear.as_ref(), None, None))
            .unwrap();

        let mut mlp = model(0);
        let err = restore(&store, 0, mlp.as_mut()).unwrap_err();
        assert!(matches!(err, Error::Checkpoint(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_parameter_map_detects_truncation() {
        let mut checkpoint = Checkpoint::capture(0, 0, model(0).as_ref(), None, None);
        checkpoint.data.pop();
        assert!(checkpoint.parameter_map().is_err());
    }
}
