//! Core data model types for adaptiq.
//!
//! Score records are the only input the analytic components consume. They
//! are plain values: built once at the loading boundary and never mutated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Learner who answered.
    pub learner_id: String,
    /// Topic the question belongs to.
    pub topic: String,
    /// Chapter the question was drawn from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    /// Whether the answer was correct.
    pub correct: bool,
    /// Difficulty the question was generated at, in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    /// When the answer was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ScoreRecord {
    /// Build a record with only the required fields set.
    pub fn new(learner_id: impl Into<String>, topic: impl Into<String>, correct: bool) -> Self {
        Self {
            learner_id: learner_id.into(),
            topic: topic.into(),
            chapter: None,
            correct,
            difficulty: None,
            timestamp: None,
        }
    }

    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = Some(chapter.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A named collection of score records, as loaded from a score file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreHistory {
    /// Unique identifier for this history.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of where the scores came from.
    #[serde(default)]
    pub description: String,
    /// Records in arrival order, most recent last.
    #[serde(default)]
    pub scores: Vec<ScoreRecord>,
}

impl ScoreHistory {
    /// Records belonging to one learner, in arrival order.
    pub fn for_learner(&self, learner_id: &str) -> Vec<ScoreRecord> {
        self.scores
            .iter()
            .filter(|s| s.learner_id == learner_id)
            .cloned()
            .collect()
    }

    /// Distinct learner ids in first-seen order.
    pub fn learners(&self) -> Vec<String> {
        let mut seen = indexmap::IndexSet::new();
        for s in &self.scores {
            seen.insert(s.learner_id.as_str());
        }
        seen.into_iter().map(str::to_string).collect()
    }
}

/// Keep only records from `chapter`.
pub fn filter_chapter(scores: &[ScoreRecord], chapter: &str) -> Vec<ScoreRecord> {
    scores
        .iter()
        .filter(|s| s.chapter.as_deref() == Some(chapter))
        .cloned()
        .collect()
}

/// How urgently a weak topic needs remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" | "med" => Ok(Priority::Medium),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Running totals for a learner, kept alongside the proficiency level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub proficiency_level: f64,
    pub completed_quizzes: u32,
    pub total_correct: u32,
    pub total_questions: u32,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            proficiency_level: 0.5,
            completed_quizzes: 0,
            total_correct: 0,
            total_questions: 0,
        }
    }
}
