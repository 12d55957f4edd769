//! Per-class metric tracking
//!
//! Each class of the one-vs-rest reduction gets its own [`ClassRun`] holding
//! hyperparameters and per-epoch metric series. Runs are persisted through a
//! pluggable [`StatsBackend`](storage::StatsBackend).
//!
//! # Example
//!
//! ```
//! use entrenar_f1::tracking::{ClassStatsLogger, MetricLogger, RunStatus};
//! use entrenar_f1::tracking::storage::{InMemoryBackend, StatsBackend};
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut backend = InMemoryBackend::new();
//! {
//!     let mut logger = ClassStatsLogger::new(2, &mut backend);
//!     logger.log_param("beta", "0.1");
//!     logger.log(0, "loss", 0.7)?;
//!     logger.log(1, "loss", 0.5)?;
//!     logger.finish(RunStatus::Completed)?;
//! }
//!
//! let run = backend.load_run(2)?;
//! assert_eq!(run.series("loss"), vec![(0, 0.7), (1, 0.5)]);
//! # Ok(())
//! # }
//! ```

pub mod storage;


use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use storage::{StatsBackend, StatsStorageError};

/// Status of a class run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Training in progress
    Active,
    /// All outer iterations completed
    Completed,
    /// Aborted by an error
    Failed,
}

/// Stats of one class run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRun {
    /// Class index within the one-vs-rest reduction
    pub class: usize,
    pub status: RunStatus,
    /// Hyperparameters, string-encoded
    pub params: BTreeMap<String, String>,
    /// Metrics: key -> list of (epoch, value)
    pub metrics: BTreeMap<String, Vec<(u64, f64)>>,
    /// Unix timestamp (ms) when the run started
    pub start_time_ms: Option<u64>,
    /// Unix timestamp (ms) when the run ended
    pub end_time_ms: Option<u64>,
}

impl ClassRun {
    fn new(class: usize) -> Self {
        Self {
            class,
            status: RunStatus::Active,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time_ms: Some(now_ms()),
            end_time_ms: None,
        }
    }

    /// All recorded (epoch, value) points for `key`
    pub fn series(&self, key: &str) -> Vec<(u64, f64)> {
        self.metrics.get(key).cloned().unwrap_or_default()
    }

    /// Most recent value for `key`
    pub fn latest(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).and_then(|v| v.last()).map(|&(_, value)| value)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Errors from metric logging
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Refusing to log non-finite value {value} for '{key}' at epoch {epoch}")]
    NonFiniteMetric { key: String, value: f64, epoch: u64 },

    #[error("Storage error: {0}")]
    Storage(#[from] StatsStorageError),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Metric sink scoped to one class run
pub trait MetricLogger {
    /// Record `value` for `key` at `epoch`
    fn log(&mut self, epoch: u64, key: &str, value: f64) -> Result<()>;

    /// Make everything logged so far durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Class-scoped logger writing through a [`StatsBackend`]
///
/// Metrics are buffered in memory and persisted on [`flush`](MetricLogger::flush)
/// and [`finish`](ClassStatsLogger::finish).
pub struct ClassStatsLogger<'a> {
    run: ClassRun,
    backend: &'a mut dyn StatsBackend,
}

impl<'a> ClassStatsLogger<'a> {
    pub fn new(class: usize, backend: &'a mut dyn StatsBackend) -> Self {
        Self {
            run: ClassRun::new(class),
            backend,
        }
    }

    pub fn class(&self) -> usize {
        self.run.class
    }

    /// Record a hyperparameter
    pub fn log_param(&mut self, key: &str, value: impl ToString) {
        self.run.params.insert(key.to_string(), value.to_string());
    }

    /// Prepend the metric history the backend already holds for this class
    ///
    /// Keeps the earlier start time. Returns `false` when the backend has no
    /// record of the class.
    pub fn continue_previous(&mut self) -> Result<bool> {
        let previous = match self.backend.load_run(self.run.class) {
            Ok(run) => run,
            Err(StatsStorageError::ClassNotFound(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        for (key, mut points) in previous.metrics {
            let current = self.run.metrics.entry(key).or_default();
            points.append(current);
            *current = points;
        }
        if previous.start_time_ms.is_some() {
            self.run.start_time_ms = previous.start_time_ms;
        }
        Ok(true)
    }

    /// In-memory view of the run
    pub fn run(&self) -> &ClassRun {
        &self.run
    }

    /// Close the run with `status` and persist it
    pub fn finish(mut self, status: RunStatus) -> Result<ClassRun> {
        self.run.status = status;
        self.run.end_time_ms = Some(now_ms());
        self.backend.save_run(&self.run)?;
        Ok(self.run)
    }
}

impl MetricLogger for ClassStatsLogger<'_> {
    fn log(&mut self, epoch: u64, key: &str, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(StatsError::NonFiniteMetric {
                key: key.to_string(),
                value,
                epoch,
            });
        }
        self.run
            .metrics
            .entry(key.to_string())
            .or_default()
            .push((epoch, value));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.backend.save_run(&self.run)?;
        Ok(())
    }
}

/// Logger that keeps every point in a flat list
///
/// Used where only the sequence of emissions matters.
#[derive(Debug, Default, Clone)]
pub struct RecordingLogger {
    pub entries: Vec<(u64, String, f64)>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values logged under `key`, in emission order
    pub fn values(&self, key: &str) -> Vec<f64> {
        self.entries
            .iter()
            .filter(|(_, k, _)| k == key)
            .map(|&(_, _, v)| v)
            .collect()
    }

    /// Epochs at which `key` was logged
    pub fn epochs(&self, key: &str) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|(_, k, _)| k == key)
            .map(|&(e, _, _)| e)
            .collect()
    }
}

impl MetricLogger for RecordingLogger {
    fn log(&mut self, epoch: u64, key: &str, value: f64) -> Result<()> {
        self.entries.push((epoch, key.to_string(), value));
        Ok(())
    }
}
