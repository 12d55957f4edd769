//! One-vs-rest driver: one independent primal-dual run per class

use super::{
    evaluate, ClassRunContext, ContextSettings, DualRates, Evaluation, OuterSummary, PrimalRates,
    Schedule, Scheduler,
};
use crate::checkpoint::{CheckpointStore, JsonCheckpointStore, NullCheckpointStore};
use crate::config::{load_config, PrimalDualSpec};
use crate::data::{synthetic, BinaryDataset, DatasetProvider};
use crate::error::Result;
use crate::models::{ConstrainedModel, ModelConfig};
use crate::tracking::storage::{JsonFileBackend, StatsBackend};
use crate::tracking::{ClassStatsLogger, MetricLogger, RunStatus};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::path::Path;

/// Outcome of one class
#[derive(Debug, Clone, PartialEq)]
pub enum ClassOutcome {
    Completed {
        /// First outer iteration run in this process
        start_outer: usize,
        summaries: Vec<OuterSummary>,
        /// `None` when the test split is empty
        evaluation: Option<Evaluation>,
    },
    /// Aborted by a non-fatal error; the driver moved on
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassResult {
    pub class: usize,
    pub outcome: ClassOutcome,
}

impl ClassResult {
    pub fn f1(&self) -> Option<f32> {
        match &self.outcome {
            ClassOutcome::Completed {
                evaluation: Some(e),
                ..
            } => Some(e.f1),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, ClassOutcome::Completed { .. })
    }
}

/// Results of every class plus the trained models, keyed by class
#[derive(Default)]
pub struct DriverReport {
    pub results: Vec<ClassResult>,
    pub models: BTreeMap<usize, Box<dyn ConstrainedModel>>,
}

impl DriverReport {
    pub fn completed(&self) -> usize {
        self.results.iter().filter(|r| r.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.completed()
    }

    /// Mean test F1 over classes that were evaluated
    pub fn macro_f1(&self) -> Option<f32> {
        let scores: Vec<f32> = self.results.iter().filter_map(ClassResult::f1).collect();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f32>() / scores.len() as f32)
    }
}

struct TrainedClass {
    model: Box<dyn ConstrainedModel>,
    start_outer: usize,
    summaries: Vec<OuterSummary>,
    evaluation: Option<Evaluation>,
}

/// Runs classes sequentially; only the dataset is shared between them
///
/// Configuration errors abort the whole run. Any other failure is recorded
/// for its class and the next class starts.
pub struct PerClassDriver<'a> {
    spec: &'a PrimalDualSpec,
    data: &'a dyn DatasetProvider,
    stats: &'a mut dyn StatsBackend,
    checkpoints: &'a mut dyn CheckpointStore,
}

impl<'a> PerClassDriver<'a> {
    pub fn new(
        spec: &'a PrimalDualSpec,
        data: &'a dyn DatasetProvider,
        stats: &'a mut dyn StatsBackend,
        checkpoints: &'a mut dyn CheckpointStore,
    ) -> Self {
        Self {
            spec,
            data,
            stats,
            checkpoints,
        }
    }

    /// Train every class of the dataset
    pub fn run(&mut self) -> Result<DriverReport> {
        self.run_classes(0..self.data.n_classes())
    }

    /// Train the given classes in order
    pub fn run_classes(&mut self, classes: impl IntoIterator<Item = usize>) -> Result<DriverReport> {
        let mut report = DriverReport::default();
        for class in classes {
            match self.run_class(class) {
                Ok(trained) => {
                    tracing::info!(
                        class,
                        outer_iterations = trained.summaries.len(),
                        f1 = ?trained.evaluation.map(|e| e.f1),
                        "class finished"
                    );
                    report.models.insert(class, trained.model);
                    report.results.push(ClassResult {
                        class,
                        outcome: ClassOutcome::Completed {
                            start_outer: trained.start_outer,
                            summaries: trained.summaries,
                            evaluation: trained.evaluation,
                        },
                    });
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(class, error = %e, "class run failed");
                    report.results.push(ClassResult {
                        class,
                        outcome: ClassOutcome::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }
        Ok(report)
    }

    fn run_class(&mut self, class: usize) -> Result<TrainedClass> {
        let train = self.data.train(class)?;
        let test = self.data.test(class)?;
        let settings = context_settings(self.spec, self.data.n_features());

        let mut logger = ClassStatsLogger::new(class, &mut *self.stats);
        log_params(&mut logger, self.spec, &train);

        let trained = train_and_evaluate(
            class,
            &settings,
            schedule(self.spec),
            train,
            &test,
            &mut logger,
            &mut *self.checkpoints,
        );

        match trained {
            Ok(trained) => {
                logger.finish(RunStatus::Completed)?;
                Ok(trained)
            }
            Err(e) => {
                if let Err(stats_error) = logger.finish(RunStatus::Failed) {
                    tracing::warn!(class, error = %stats_error, "could not persist failed run");
                }
                Err(e)
            }
        }
    }
}

/// Train every class of the synthetic dataset described by `spec`
///
/// Stats go to `<stats folder>/class_<c>/stats.json`; checkpoints are kept
/// only when a checkpoint folder is configured.
pub fn train_from_spec(spec: &PrimalDualSpec) -> Result<DriverReport> {
    let mut rng = StdRng::seed_from_u64(spec.seed());
    let data = synthetic::generate(&spec.dataset, &mut rng)?;

    let mut stats = JsonFileBackend::new(&spec.stats_folder);
    let mut checkpoints: Box<dyn CheckpointStore> = match &spec.checkpoint_folder {
        Some(dir) => Box::new(JsonCheckpointStore::new(dir)),
        None => Box::new(NullCheckpointStore),
    };

    PerClassDriver::new(spec, &data, &mut stats, checkpoints.as_mut()).run()
}

/// Load, validate and train from a YAML file
pub fn train_from_yaml<P: AsRef<Path>>(config_path: P) -> Result<DriverReport> {
    let spec = load_config(config_path)?;
    train_from_spec(&spec)
}

fn train_and_evaluate(
    class: usize,
    settings: &ContextSettings,
    schedule: Schedule,
    train: BinaryDataset,
    test: &BinaryDataset,
    logger: &mut ClassStatsLogger<'_>,
    checkpoints: &mut dyn CheckpointStore,
) -> Result<TrainedClass> {
    let (context, start_outer) = ClassRunContext::initialize(class, settings, train, &*checkpoints)?;
    if start_outer > 0 && logger.continue_previous()? {
        tracing::debug!(class, "continuing stored stats");
    }

    let mut scheduler = Scheduler::new(context, start_outer, schedule, &mut *logger, checkpoints);
    let summaries = scheduler.run()?;
    let epoch = scheduler.epoch();
    let context = scheduler.into_context();

    let evaluation = if test.is_empty() {
        None
    } else {
        let evaluation = evaluate(context.model.as_ref(), test)?;
        evaluation.log_to(logger, epoch)?;
        Some(evaluation)
    };
    logger.flush()?;

    Ok(TrainedClass {
        model: context.model,
        start_outer,
        summaries,
        evaluation,
    })
}

fn context_settings(spec: &PrimalDualSpec, input_dim: usize) -> ContextSettings {
    ContextSettings {
        model: spec.model.clone(),
        model_config: ModelConfig {
            input_dim,
            hidden_units: spec.hidden_units,
        },
        rates: PrimalRates {
            model: spec.learning_rate,
            tau: spec.eta_tau,
            eps: spec.eta_eps,
            w: spec.eta_w,
        },
        seed: spec.seed(),
    }
}

fn schedule(spec: &PrimalDualSpec) -> Schedule {
    Schedule {
        n_outer: spec.n_outer,
        n_inner: spec.n_inner,
        beta: spec.beta,
        dual_rates: DualRates {
            lambda: spec.eta_lamb,
            gamma: spec.eta_gamma,
            mu: spec.eta_mu,
        },
    }
}

fn log_params(logger: &mut ClassStatsLogger<'_>, spec: &PrimalDualSpec, train: &BinaryDataset) {
    logger.log_param("model", &spec.model);
    logger.log_param("n_outer", spec.n_outer);
    logger.log_param("n_inner", spec.n_inner);
    logger.log_param("learning rate", spec.learning_rate);
    logger.log_param("eta_tau", spec.eta_tau);
    logger.log_param("eta_eps", spec.eta_eps);
    logger.log_param("eta_w", spec.eta_w);
    logger.log_param("eta_lamb", spec.eta_lamb);
    logger.log_param("eta_gamma", spec.eta_gamma);
    logger.log_param("eta_mu", spec.eta_mu);
    logger.log_param("beta", spec.beta);
    logger.log_param("seed", spec.seed());
    logger.log_param("n_train", train.len());
    logger.log_param("n_positives", train.num_positives());
}
