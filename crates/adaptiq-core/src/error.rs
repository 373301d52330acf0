//! Error types.
//!
//! The analytic components never fail: degenerate input resolves to
//! documented defaults. What remains are errors from the persistence
//! collaborator and rejected submissions at the engine boundary.

use thiserror::Error;

/// Errors raised by a [`ProficiencyStore`](crate::traits::ProficiencyStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Persisted state could not be encoded or decoded.
    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A level outside [0, 1] or non-finite was offered for storage.
    #[error("invalid proficiency {level} for learner {learner_id}")]
    InvalidLevel { learner_id: String, level: f64 },
}

/// Why the complexity estimator fell back to its neutral value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    #[error("text is empty")]
    EmptyText,

    #[error("text has no content terms")]
    NoContentTerms,

    #[error("term weights did not produce a finite value")]
    NonFinite,
}

/// Errors returned by the [`AdaptiveEngine`](crate::engine::AdaptiveEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// A submission carried no scores.
    #[error("no scores provided")]
    EmptySubmission,

    /// A submission mixed in records from another learner.
    #[error("score for learner {found} submitted under learner {expected}")]
    LearnerMismatch { expected: String, found: String },

    /// A difficulty preference outside [0, 1].
    #[error("difficulty preference {0} is outside [0, 1]")]
    InvalidPreference(f64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns `true` if the caller sent bad input, as opposed to a store failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        assert!(EngineError::EmptySubmission.is_client_error());
        assert!(EngineError::InvalidPreference(1.5).is_client_error());
        let store = EngineError::from(StoreError::InvalidLevel {
            learner_id: "a".into(),
            level: f64::NAN,
        });
        assert!(!store.is_client_error());
    }

    #[test]
    fn fallback_reason_messages() {
        assert_eq!(FallbackReason::EmptyText.to_string(), "text is empty");
        assert_eq!(
            serde_json::to_string(&FallbackReason::NoContentTerms).unwrap(),
            "\"no_content_terms\""
        );
    }
}
