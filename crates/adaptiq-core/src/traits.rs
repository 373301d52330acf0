//! Core trait definitions for proficiency persistence.
//!
//! Stores are implemented by the `adaptiq-store` crate. The core only needs
//! a keyed get/put; serializing updates per learner is the tracker's job.

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Proficiency store trait
// ---------------------------------------------------------------------------

/// Trait for backends that hold each learner's proficiency level.
pub trait ProficiencyStore: Send + Sync {
    /// Human-readable store name (e.g. "memory").
    fn name(&self) -> &str;

    /// Stored level for a learner, or `None` if the learner is unseen.
    fn get(&self, learner_id: &str) -> Result<Option<f64>, StoreError>;

    /// Replace the stored level for a learner.
    fn put(&self, learner_id: &str, level: f64) -> Result<(), StoreError>;

    /// All learners with a stored level.
    fn learners(&self) -> Result<Vec<String>, StoreError>;
}

/// Reject levels that are non-finite or outside [0, 1].
pub fn check_level(learner_id: &str, level: f64) -> Result<(), StoreError> {
    if level.is_finite() && (0.0..=1.0).contains(&level) {
        Ok(())
    } else {
        Err(StoreError::InvalidLevel {
            learner_id: learner_id.to_string(),
            level,
        })
    }
}
