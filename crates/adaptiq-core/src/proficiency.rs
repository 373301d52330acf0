//! Per-learner proficiency tracking.
//!
//! Each update folds the correct ratio of the learner's most recent answers
//! into the stored level with exponential smoothing:
//!
//! new = smoothing * previous + (1 - smoothing) * correct_ratio
//!
//! Updates for one learner are serialized through a keyed lock, so two
//! submissions racing for the same learner cannot interleave their
//! read-modify-write. Different learners never contend.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::ScoreRecord;
use crate::traits::ProficiencyStore;

/// Tuning for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// How many of the most recent records make up the window.
    #[serde(default = "default_window")]
    pub window_size: usize,
    /// Weight kept from the previous level.
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    /// Level assumed for unseen learners.
    #[serde(default = "default_level")]
    pub default_level: f64,
}

fn default_window() -> usize {
    10
}
fn default_smoothing() -> f64 {
    0.7
}
fn default_level() -> f64 {
    0.5
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_size: default_window(),
            smoothing: default_smoothing(),
            default_level: default_level(),
        }
    }
}

impl TrackerConfig {
    /// Check that the settings describe a usable tracker.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.window_size >= 1, "tracker.window_size must be at least 1");
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.smoothing),
            "tracker.smoothing must be between 0.0 and 1.0"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.default_level),
            "tracker.default_level must be between 0.0 and 1.0"
        );
        Ok(())
    }
}

/// Maintains each learner's proficiency in an injected store.
pub struct ProficiencyTracker {
    store: Arc<dyn ProficiencyStore>,
    config: TrackerConfig,
    /// Per-learner write locks. Entries are never removed, matching the
    /// lifetime of the stored levels they guard.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ProficiencyTracker {
    pub fn new(store: Arc<dyn ProficiencyStore>, config: TrackerConfig) -> Self {
        Self {
            store,
            config,
            locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ProficiencyStore> {
        &self.store
    }

    /// Fold a learner's history into their stored level and return it.
    ///
    /// An empty history returns the default level. It initializes an unseen
    /// learner but leaves an existing stored level alone.
    pub fn update_level(
        &self,
        learner_id: &str,
        history: &[ScoreRecord],
    ) -> Result<f64, StoreError> {
        let lock = self.lock_for(learner_id);
        let _guard = lock.lock();

        let stored = self.store.get(learner_id)?;

        if history.is_empty() {
            if stored.is_none() {
                self.store.put(learner_id, self.config.default_level)?;
            }
            return Ok(self.config.default_level);
        }

        let window = recent_window(history, self.config.window_size);
        let ratio = correct_ratio(window);
        let previous = stored.unwrap_or(self.config.default_level);
        let level = self.config.smoothing * previous + (1.0 - self.config.smoothing) * ratio;

        self.store.put(learner_id, level)?;
        tracing::debug!(
            learner_id,
            window = window.len(),
            ratio,
            previous,
            level,
            "proficiency updated"
        );
        Ok(level)
    }

    /// Stored level for a learner, or the default when unseen.
    pub fn current_level(&self, learner_id: &str) -> Result<f64, StoreError> {
        Ok(self
            .store
            .get(learner_id)?
            .unwrap_or(self.config.default_level))
    }

    fn lock_for(&self, learner_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(learner_id.to_string()).or_default().value())
    }
}

/// The last `size` records of `history` (all of them if fewer).
pub fn recent_window(history: &[ScoreRecord], size: usize) -> &[ScoreRecord] {
    &history[history.len().saturating_sub(size)..]
}

/// Share of correct answers; 0.0 for an empty slice.
pub fn correct_ratio(records: &[ScoreRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let correct = records.iter().filter(|r| r.correct).count();
    correct as f64 / records.len() as f64
}
