//! Integration tests for the primal-dual scheduler and the per-class driver

use entrenar_f1::checkpoint::{CheckpointStore, InMemoryCheckpointStore, JsonCheckpointStore, NullCheckpointStore};
use entrenar_f1::config::{parse_config, PrimalDualSpec};
use entrenar_f1::data::{BinaryDataset, DatasetProvider, MultiLabelDataset, Sample, SplitMultiLabel};
use entrenar_f1::models::{parameter_snapshot, ConstrainedModel, ModelConfig};
use entrenar_f1::primal_dual::{
    ClassOutcome, ClassRunContext, ContextSettings, DualRates, PerClassDriver, PrimalRates,
    Schedule, Scheduler,
};
use entrenar_f1::tracking::storage::{InMemoryBackend, JsonFileBackend, StatsBackend};
use entrenar_f1::tracking::{RecordingLogger, RunStatus};
use entrenar_f1::{Error, Result};
use ndarray::Array1;

/// Two linearly separable clusters of 10 points each
fn separable(n: usize) -> BinaryDataset {
    BinaryDataset::new(
        (0..n)
            .map(|i| {
                let offset = 0.05 * (i / 2) as f32;
                if i % 2 == 0 {
                    Sample::new(vec![1.0 + offset, 0.8 - offset], 1)
                } else {
                    Sample::new(vec![-1.0 - offset, -0.6 + offset], 0)
                }
            })
            .collect(),
    )
}

fn spec_yaml(n_outer: usize, n_inner: usize) -> String {
    format!(
        r#"
n_outer: {n_outer}
n_inner: {n_inner}
learning rate: 0.05
eta_tau: 0.01
eta_eps: 0.01
eta_w: 0.01
eta_lamb: 0.0001
eta_gamma: 0.0001
eta_mu: 0.0001
beta: 0.1
stats folder: stats
model: LinearTwoHead
seed: 17
"#
    )
}

fn spec(n_outer: usize, n_inner: usize) -> PrimalDualSpec {
    parse_config(&spec_yaml(n_outer, n_inner)).unwrap()
}

/// Multi-label data whose classes all share one label column
fn identical_classes(n_classes: usize) -> SplitMultiLabel {
    let rows = separable(12);
    let features: Vec<Array1<f32>> = rows.iter().map(|s| s.features.clone()).collect();
    let labels: Vec<Vec<u8>> = rows.iter().map(|s| vec![s.label; n_classes]).collect();
    let data = MultiLabelDataset::new(features, labels, n_classes).unwrap();
    let (train, test) = data.split_at(8);
    SplitMultiLabel { train, test }
}

#[test]
fn test_loss_moving_average_decreases_on_separable_data() {
    let train = separable(20);
    let settings = ContextSettings {
        model: "LinearTwoHead".into(),
        model_config: ModelConfig {
            input_dim: 2,
            hidden_units: 1,
        },
        rates: PrimalRates {
            model: 0.05,
            tau: 0.01,
            eps: 0.01,
            w: 0.01,
        },
        seed: 17,
    };
    let schedule = Schedule {
        n_outer: 50,
        n_inner: 20,
        beta: 0.1,
        dual_rates: DualRates {
            lambda: 0.0001,
            gamma: 0.0001,
            mu: 0.0001,
        },
    };

    let (ctx, start) = ClassRunContext::initialize(0, &settings, train, &NullCheckpointStore).unwrap();
    let mut logger = RecordingLogger::new();
    let mut store = NullCheckpointStore;
    let summaries = Scheduler::new(ctx, start, schedule, &mut logger, &mut store)
        .run()
        .unwrap();
    assert_eq!(summaries.len(), 50);

    let losses: Vec<f32> = summaries.iter().map(|s| s.mean_loss).collect();
    let moving: Vec<f32> = losses
        .windows(10)
        .map(|w| w.iter().sum::<f32>() / 10.0)
        .collect();
    for k in 5..moving.len() - 1 {
        assert!(
            moving[k + 1] <= moving[k],
            "moving average rose at outer {}: {} -> {}",
            k + 1,
            moving[k],
            moving[k + 1]
        );
    }
    assert!(losses[49] < losses[0]);
    assert!(summaries.iter().all(|s| s.eps >= 0.0));
    // 1000 steps over 20 samples
    assert_eq!(logger.epochs("loss").len(), 50);
}

#[test]
fn test_identical_classes_train_identical_models() {
    let data = identical_classes(2);
    let spec = spec(3, 5);
    let mut stats = InMemoryBackend::new();
    let mut checkpoints = NullCheckpointStore;

    let report = PerClassDriver::new(&spec, &data, &mut stats, &mut checkpoints)
        .run()
        .unwrap();

    assert_eq!(report.completed(), 2);
    let bits = |model: &dyn ConstrainedModel| {
        parameter_snapshot(model)
            .into_iter()
            .map(|(name, values)| (name, values.iter().map(|v| v.to_bits()).collect::<Vec<_>>()))
            .collect::<Vec<_>>()
    };
    assert_eq!(bits(report.models[&0].as_ref()), bits(report.models[&1].as_ref()));
    assert_eq!(report.results[0].outcome, report.results[1].outcome);
}

#[test]
fn test_driver_logs_per_class_stats() {
    let dir = tempfile::tempdir().unwrap();
    let data = identical_classes(3);
    let spec = spec(2, 8);
    let mut stats = JsonFileBackend::new(dir.path());
    let mut checkpoints = NullCheckpointStore;

    let report = PerClassDriver::new(&spec, &data, &mut stats, &mut checkpoints)
        .run()
        .unwrap();
    assert_eq!(report.completed(), 3);
    assert!(report.macro_f1().is_some());

    let runs = stats.list_runs().unwrap();
    assert_eq!(runs.len(), 3);
    for run in runs {
        assert_eq!(run.status, RunStatus::Completed);
        // 16 steps over 8 samples
        assert_eq!(
            run.series("loss").iter().map(|&(e, _)| e).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(run.series("t1loss").len(), 2);
        assert_eq!(run.series("t2loss").len(), 2);
        assert!(run.latest("test_f1").is_some());
        assert_eq!(run.params.get("model").map(String::as_str), Some("LinearTwoHead"));
    }
}

/// Provider whose class 1 has no training samples
struct OneEmptyClass(SplitMultiLabel);

impl DatasetProvider for OneEmptyClass {
    fn n_classes(&self) -> usize {
        self.0.n_classes()
    }

    fn n_features(&self) -> usize {
        self.0.n_features()
    }

    fn train(&self, class: usize) -> Result<BinaryDataset> {
        if class == 1 {
            Ok(BinaryDataset::default())
        } else {
            self.0.train(class)
        }
    }

    fn test(&self, class: usize) -> Result<BinaryDataset> {
        self.0.test(class)
    }
}

#[test]
fn test_driver_continues_after_class_failure() {
    let data = OneEmptyClass(identical_classes(3));
    let spec = spec(1, 4);
    let mut stats = InMemoryBackend::new();
    let mut checkpoints = NullCheckpointStore;

    let report = PerClassDriver::new(&spec, &data, &mut stats, &mut checkpoints)
        .run()
        .unwrap();

    assert_eq!(report.completed(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.results[1].outcome, ClassOutcome::Failed { .. }));
    assert!(!report.models.contains_key(&1));
    assert_eq!(stats.load_run(1).unwrap().status, RunStatus::Failed);
}

#[test]
fn test_driver_aborts_on_configuration_error() {
    let data = identical_classes(2);
    let mut spec = spec(1, 4);
    spec.model = "DeepLabV3".into();
    let mut stats = InMemoryBackend::new();
    let mut checkpoints = NullCheckpointStore;

    let err = PerClassDriver::new(&spec, &data, &mut stats, &mut checkpoints)
        .run()
        .err()
        .unwrap();
    assert!(matches!(err, Error::UnknownModel { .. }));
}

#[test]
fn test_resumed_run_matches_uninterrupted_run() {
    let data = identical_classes(1);
    // n_inner equals the split size, so every outer iteration starts at index 0
    let mut stats = InMemoryBackend::new();

    let mut uninterrupted = NullCheckpointStore;
    let full = PerClassDriver::new(&spec(5, 8), &data, &mut stats, &mut uninterrupted)
        .run()
        .unwrap();

    let mut store = InMemoryCheckpointStore::new();
    PerClassDriver::new(&spec(3, 8), &data, &mut stats, &mut store)
        .run()
        .unwrap();
    assert_eq!(store.load(0).unwrap().map(|c| c.last_outer), Some(2));

    let resumed = PerClassDriver::new(&spec(5, 8), &data, &mut stats, &mut store)
        .run()
        .unwrap();

    match &resumed.results[0].outcome {
        ClassOutcome::Completed {
            start_outer,
            summaries,
            ..
        } => {
            assert_eq!(*start_outer, 3);
            assert_eq!(summaries.iter().map(|s| s.outer).collect::<Vec<_>>(), vec![3, 4]);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        parameter_snapshot(resumed.models[&0].as_ref()),
        parameter_snapshot(full.models[&0].as_ref())
    );
}

#[test]
fn test_json_checkpoints_survive_between_drivers() {
    let dir = tempfile::tempdir().unwrap();
    let data = identical_classes(2);
    let mut stats = InMemoryBackend::new();

    let mut store = JsonCheckpointStore::new(dir.path());
    PerClassDriver::new(&spec(2, 4), &data, &mut stats, &mut store)
        .run()
        .unwrap();
    assert!(store.path(0).is_file());
    assert!(store.path(1).is_file());

    let mut reopened = JsonCheckpointStore::new(dir.path());
    let report = PerClassDriver::new(&spec(4, 4), &data, &mut stats, &mut reopened)
        .run()
        .unwrap();
    for result in &report.results {
        match &result.outcome {
            ClassOutcome::Completed { start_outer, .. } => assert_eq!(*start_outer, 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn test_resume_continues_stats_history_mid_epoch() {
    let data = identical_classes(1);
    // 5 steps per outer over 8 samples: the checkpoint lands mid-epoch
    let full_dir = tempfile::tempdir().unwrap();
    let mut full_stats = JsonFileBackend::new(full_dir.path());
    let full = PerClassDriver::new(&spec(5, 5), &data, &mut full_stats, &mut NullCheckpointStore)
        .run()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut stats = JsonFileBackend::new(dir.path());
    let mut store = InMemoryCheckpointStore::new();
    PerClassDriver::new(&spec(3, 5), &data, &mut stats, &mut store)
        .run()
        .unwrap();
    let epochs = |run: &entrenar_f1::tracking::ClassRun| {
        run.series("loss").iter().map(|&(e, _)| e).collect::<Vec<_>>()
    };
    assert_eq!(epochs(&stats.load_run(0).unwrap()), vec![1]);
    let saved = store.load(0).unwrap().unwrap();
    assert_eq!(saved.progress.global_step, 15);
    assert_eq!(saved.progress.pending_steps, 7);

    let resumed = PerClassDriver::new(&spec(5, 5), &data, &mut stats, &mut store)
        .run()
        .unwrap();

    let resumed_run = stats.load_run(0).unwrap();
    let full_run = full_stats.load_run(0).unwrap();
    assert_eq!(epochs(&resumed_run), vec![1, 2, 3]);
    for key in ["loss", "t1loss", "t2loss"] {
        assert_eq!(resumed_run.series(key), full_run.series(key), "{key}");
    }
    assert_eq!(resumed_run.status, RunStatus::Completed);
    assert_eq!(
        parameter_snapshot(resumed.models[&0].as_ref()),
        parameter_snapshot(full.models[&0].as_ref())
    );
}
