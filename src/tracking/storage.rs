//! Stats storage backends
//!
//! Provides the [`StatsBackend`] trait, a JSON file backend writing one
//! `class_<c>/stats.json` per class under the stats folder, and an in-memory
//! backend for tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ClassRun, RunStatus};

/// Errors from stats storage operations
#[derive(Debug, thiserror::Error)]
pub enum StatsStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No stats recorded for class {0}")]
    ClassNotFound(usize),
}

/// Result alias for stats storage operations
pub type Result<T> = std::result::Result<T, StatsStorageError>;

/// A single metric data point for serialization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricEntry {
    pub epoch: u64,
    pub value: f64,
}

/// On-disk shape of a class run
///
/// Metric series are keyed in sorted order so files diff cleanly between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRecord {
    pub class: usize,
    pub status: RunStatus,
    pub params: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, Vec<MetricEntry>>,
    pub start_time_ms: Option<u64>,
    pub end_time_ms: Option<u64>,
}

impl From<&ClassRun> for StatsRecord {
    fn from(run: &ClassRun) -> Self {
        Self {
            class: run.class,
            status: run.status,
            params: run.params.clone(),
            metrics: run
                .metrics
                .iter()
                .map(|(k, v)| {
                    (
                        k.clone(),
                        v.iter()
                            .map(|&(epoch, value)| MetricEntry { epoch, value })
                            .collect(),
                    )
                })
                .collect(),
            start_time_ms: run.start_time_ms,
            end_time_ms: run.end_time_ms,
        }
    }
}

impl StatsRecord {
    /// Convert back into a `ClassRun`
    pub fn into_run(self) -> ClassRun {
        ClassRun {
            class: self.class,
            status: self.status,
            params: self.params,
            metrics: self
                .metrics
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().map(|e| (e.epoch, e.value)).collect()))
                .collect(),
            start_time_ms: self.start_time_ms,
            end_time_ms: self.end_time_ms,
        }
    }
}

/// Trait for stats storage backends
///
/// Saving the same class twice replaces the earlier record.
pub trait StatsBackend {
    /// Persist the current state of a class run
    fn save_run(&mut self, run: &ClassRun) -> Result<()>;

    /// Load the stats of one class
    fn load_run(&self, class: usize) -> Result<ClassRun>;

    /// All stored class runs, ordered by class index
    fn list_runs(&self) -> Result<Vec<ClassRun>>;
}

/// JSON file stats backend
///
/// # Example
///
/// ```no_run
/// use entrenar_f1::tracking::storage::JsonFileBackend;
///
/// let backend = JsonFileBackend::new("stats");
/// assert!(backend.stats_path(3).ends_with("class_3/stats.json"));
/// ```
#[derive(Debug)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend rooted at `dir`; directories are created on first save
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn class_dir(&self, class: usize) -> PathBuf {
        self.dir.join(format!("class_{class}"))
    }

    pub fn stats_path(&self, class: usize) -> PathBuf {
        self.class_dir(class).join("stats.json")
    }
}

impl StatsBackend for JsonFileBackend {
    fn save_run(&mut self, run: &ClassRun) -> Result<()> {
        fs::create_dir_all(self.class_dir(run.class))?;
        let record = StatsRecord::from(run);
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(self.stats_path(run.class), json)?;
        Ok(())
    }

    fn load_run(&self, class: usize) -> Result<ClassRun> {
        let path = self.stats_path(class);
        if !path.exists() {
            return Err(StatsStorageError::ClassNotFound(class));
        }
        let json = fs::read_to_string(path)?;
        let record: StatsRecord = serde_json::from_str(&json)?;
        Ok(record.into_run())
    }

    fn list_runs(&self) -> Result<Vec<ClassRun>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path().join("stats.json");
            if path.is_file() {
                let json = fs::read_to_string(&path)?;
                let record: StatsRecord = serde_json::from_str(&json)?;
                runs.push(record.into_run());
            }
        }
        runs.sort_by_key(|r| r.class);
        Ok(runs)
    }
}

/// In-memory stats backend for testing
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    runs: BTreeMap<usize, StatsRecord>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsBackend for InMemoryBackend {
    fn save_run(&mut self, run: &ClassRun) -> Result<()> {
        self.runs.insert(run.class, StatsRecord::from(run));
        Ok(())
    }

    fn load_run(&self, class: usize) -> Result<ClassRun> {
        self.runs
            .get(&class)
            .map(|r| r.clone().into_run())
            .ok_or(StatsStorageError::ClassNotFound(class))
    }

    fn list_runs(&self) -> Result<Vec<ClassRun>> {
        Ok(self.runs.values().map(|r| r.clone().into_run()).collect())
    }
}
