//! Proficiency store backed by a JSON file.
//!
//! The whole map is read when the store is opened and rewritten on every
//! `put`. Writes go to a sibling temp file that is then renamed over the
//! target, so a crash mid-write leaves the previous state intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use adaptiq_core::error::StoreError;
use adaptiq_core::traits::{check_level, ProficiencyStore};

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    levels: BTreeMap<String, f64>,
}

pub struct JsonFileStore {
    path: PathBuf,
    levels: RwLock<BTreeMap<String, f64>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts empty and is created
    /// on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let levels = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                let state: StateFile = serde_json::from_str(&content)?;
                for (id, level) in &state.levels {
                    check_level(id, *level)?;
                }
                state.levels
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), learners = levels.len(), "opened state file");
        Ok(Self {
            path,
            levels: RwLock::new(levels),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, levels: &BTreeMap<String, f64>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
        }

        let state = StateFile {
            levels: levels.clone(),
        };
        let json = serde_json::to_string_pretty(&state)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }
}

impl ProficiencyStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    fn get(&self, learner_id: &str) -> Result<Option<f64>, StoreError> {
        Ok(self.levels.read().get(learner_id).copied())
    }

    fn put(&self, learner_id: &str, level: f64) -> Result<(), StoreError> {
        check_level(learner_id, level)?;
        let mut levels = self.levels.write();
        let previous = levels.insert(learner_id.to_string(), level);
        if let Err(e) = self.persist(&levels) {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(p) => levels.insert(learner_id.to_string(), p),
                None => levels.remove(learner_id),
            };
            return Err(e);
        }
        Ok(())
    }

    fn learners(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.levels.read().keys().cloned().collect())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
