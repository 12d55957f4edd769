//! Checkpoint storage backends

use super::Checkpoint;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-class checkpoint persistence
pub trait CheckpointStore {
    /// Latest checkpoint of `class`, `None` when there is none
    fn load(&self, class: usize) -> Result<Option<Checkpoint>>;

    /// Replace the checkpoint of `checkpoint.class`
    fn save(&mut self, checkpoint: &Checkpoint) -> Result<()>;
}

/// JSON files named `class_<c>.json` under one folder
///
/// Writes go to a temporary file first and are renamed into place, so an
/// interrupted save leaves the previous checkpoint intact.
#[derive(Debug)]
pub struct JsonCheckpointStore {
    dir: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, class: usize) -> PathBuf {
        self.dir.join(format!("class_{class}.json"))
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self, class: usize) -> Result<Option<Checkpoint>> {
        let path = self.path(class);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        let checkpoint: Checkpoint = serde_json::from_str(&json).map_err(|e| {
            Error::Checkpoint(format!("Failed to parse {}: {e}", path.display()))
        })?;
        if checkpoint.class != class {
            return Err(Error::Checkpoint(format!(
                "{} holds class {}, expected {class}",
                path.display(),
                checkpoint.class
            )));
        }
        Ok(Some(checkpoint))
    }

    fn save(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(checkpoint)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
        let path = self.path(checkpoint.class);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Checkpoints kept in memory
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    checkpoints: BTreeMap<usize, Checkpoint>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of classes with a checkpoint
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn load(&self, class: usize) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.get(&class).cloned())
    }

    fn save(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        self.checkpoints.insert(checkpoint.class, checkpoint.clone());
        Ok(())
    }
}

/// Store that never holds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCheckpointStore;

impl CheckpointStore for NullCheckpointStore {
    fn load(&self, _class: usize) -> Result<Option<Checkpoint>> {
        Ok(None)
    }

    fn save(&mut self, _checkpoint: &Checkpoint) -> Result<()> {
        Ok(())
    }
}
