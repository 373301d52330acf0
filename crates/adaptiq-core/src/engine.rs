//! Adaptive engine orchestrator.
//!
//! Composes the tracker, complexity estimator, blender, and analyzer into the
//! two decisions the request layer asks for: how hard the next quiz should be,
//! and which topics need remediation. Also keeps each learner's submitted
//! history and running totals in memory, and replays batches of submissions
//! with learners processed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use dashmap::DashMap;
use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::analyzer::{AnalyzerConfig, PerformanceAnalyzer, Recommendation, Summary};
use crate::blend::{BlenderConfig, DifficultyBlender};
use crate::complexity::{Complexity, ComplexityEstimator};
use crate::error::{EngineError, FallbackReason};
use crate::model::{filter_chapter, LearnerProfile, ScoreRecord};
use crate::proficiency::{ProficiencyTracker, TrackerConfig};
use crate::traits::ProficiencyStore;

/// Configuration for the engine's components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub blender: BlenderConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// Extra stop words for the complexity estimator.
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;
        self.blender.validate()?;
        self.analyzer.validate()?;
        Ok(())
    }
}

/// Everything the request layer supplies when asking for a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    pub learner_id: String,
    /// Chapter text the quiz will be generated from.
    #[serde(default)]
    pub chapter_text: Option<String>,
    /// Restrict topic recommendations to this chapter.
    #[serde(default)]
    pub chapter: Option<String>,
    /// The learner's answers so far, most recent last.
    #[serde(default)]
    pub past_scores: Vec<ScoreRecord>,
    /// Explicit difficulty chosen by the learner; bypasses blending.
    #[serde(default)]
    pub difficulty_preference: Option<f64>,
}

/// Where a plan's difficulty came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultySource {
    Blended,
    Preference,
}

/// Difficulty and remediation topics for the next quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizPlan {
    pub learner_id: String,
    pub difficulty: f64,
    pub difficulty_source: DifficultySource,
    /// Learner proficiency after folding in `past_scores`.
    pub proficiency: f64,
    pub complexity: Complexity,
    pub recommended_topics: Vec<Recommendation>,
}

/// A learner's submitted history and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerScores {
    pub learner_id: String,
    pub scores: Vec<ScoreRecord>,
    pub stats: LearnerProfile,
}

/// One completed quiz to be recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub learner_id: String,
    pub scores: Vec<ScoreRecord>,
}

/// Outcome of replaying a batch of submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayOutcome {
    /// Final profile per learner, in first-seen order.
    pub profiles: IndexMap<String, LearnerProfile>,
    pub completed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Progress reporting trait for batch replays.
pub trait ProgressReporter: Send + Sync {
    fn on_learner_start(&self, learner_id: &str, submissions: usize);
    fn on_submission_complete(&self, learner_id: &str, profile: &LearnerProfile);
    fn on_submission_error(&self, learner_id: &str, error: &str);
    fn on_replay_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_learner_start(&self, _: &str, _: usize) {}
    fn on_submission_complete(&self, _: &str, _: &LearnerProfile) {}
    fn on_submission_error(&self, _: &str, _: &str) {}
    fn on_replay_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

#[derive(Default)]
struct LearnerState {
    scores: Vec<ScoreRecord>,
    profile: LearnerProfile,
}

/// The adaptive engine.
pub struct AdaptiveEngine {
    tracker: ProficiencyTracker,
    estimator: ComplexityEstimator,
    blender: DifficultyBlender,
    analyzer: PerformanceAnalyzer,
    /// One entry per learner seen, kept for the life of the engine.
    learners: DashMap<String, Arc<Mutex<LearnerState>>>,
}

impl AdaptiveEngine {
    /// Build an engine over `store`. Fails when `config` does not validate.
    pub fn new(store: Arc<dyn ProficiencyStore>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracker: ProficiencyTracker::new(store, config.tracker),
            estimator: ComplexityEstimator::new().with_stop_words(&config.extra_stop_words),
            blender: DifficultyBlender::new(config.blender)?,
            analyzer: PerformanceAnalyzer::new(config.analyzer),
            learners: DashMap::new(),
        })
    }

    pub fn tracker(&self) -> &ProficiencyTracker {
        &self.tracker
    }

    pub fn analyzer(&self) -> &PerformanceAnalyzer {
        &self.analyzer
    }

    /// Decide the difficulty and remediation topics for the learner's next quiz.
    ///
    /// The learner's proficiency is always updated from `past_scores`, even
    /// when a preference overrides the blended difficulty.
    pub fn plan_quiz(&self, request: &QuizRequest) -> Result<QuizPlan, EngineError> {
        if let Some(pref) = request.difficulty_preference {
            if !(0.0..=1.0).contains(&pref) {
                return Err(EngineError::InvalidPreference(pref));
            }
        }

        let proficiency = self
            .tracker
            .update_level(&request.learner_id, &request.past_scores)?;

        let complexity = match request.chapter_text.as_deref() {
            Some(text) => self.estimator.estimate_complexity(text),
            None => Complexity::Defaulted {
                reason: FallbackReason::EmptyText,
            },
        };
        if let Some(reason) = complexity.fallback_reason() {
            tracing::debug!(learner_id = %request.learner_id, %reason, "complexity fell back to neutral");
        }

        let (difficulty, difficulty_source) = match request.difficulty_preference {
            Some(pref) => (pref, DifficultySource::Preference),
            None => (
                self.blender.blend(proficiency, complexity.value()),
                DifficultySource::Blended,
            ),
        };

        let summary = self.analytics(&request.past_scores, request.chapter.as_deref());

        tracing::info!(
            learner_id = %request.learner_id,
            difficulty,
            proficiency,
            recommended = summary.recommendations.len(),
            "quiz planned"
        );

        Ok(QuizPlan {
            learner_id: request.learner_id.clone(),
            difficulty,
            difficulty_source,
            proficiency,
            complexity,
            recommended_topics: summary.recommendations,
        })
    }

    /// Analyze a score collection, optionally restricted to one chapter.
    pub fn analytics(&self, scores: &[ScoreRecord], chapter: Option<&str>) -> Summary {
        match chapter {
            Some(ch) => self.analyzer.analyze(&filter_chapter(scores, ch)),
            None => self.analyzer.analyze(scores),
        }
    }

    /// Record a completed quiz and return the learner's updated totals.
    pub fn submit_scores(
        &self,
        learner_id: &str,
        scores: Vec<ScoreRecord>,
    ) -> Result<LearnerProfile, EngineError> {
        if scores.is_empty() {
            return Err(EngineError::EmptySubmission);
        }
        if let Some(other) = scores.iter().find(|s| s.learner_id != learner_id) {
            return Err(EngineError::LearnerMismatch {
                expected: learner_id.to_string(),
                found: other.learner_id.clone(),
            });
        }

        let state = self.state_for(learner_id);
        let mut state = state.lock();

        let correct = scores.iter().filter(|s| s.correct).count() as u32;
        let questions = scores.len() as u32;
        let previous_len = state.scores.len();
        state.scores.extend(scores);

        // A failed store write leaves the history as it was.
        let level = match self.tracker.update_level(learner_id, &state.scores) {
            Ok(level) => level,
            Err(e) => {
                state.scores.truncate(previous_len);
                return Err(e.into());
            }
        };

        let profile = &mut state.profile;
        profile.completed_quizzes += 1;
        profile.total_correct += correct;
        profile.total_questions += questions;
        profile.proficiency_level = level;

        tracing::debug!(
            learner_id,
            quizzes = profile.completed_quizzes,
            level,
            "scores submitted"
        );
        Ok(profile.clone())
    }

    /// A learner's submitted history and totals. Unknown learners get an
    /// empty history and the stored (or default) level.
    pub fn learner_scores(&self, learner_id: &str) -> Result<LearnerScores, EngineError> {
        let existing = self.learners.get(learner_id).map(|s| Arc::clone(s.value()));
        if let Some(state) = existing {
            let state = state.lock();
            return Ok(LearnerScores {
                learner_id: learner_id.to_string(),
                scores: state.scores.clone(),
                stats: state.profile.clone(),
            });
        }

        Ok(LearnerScores {
            learner_id: learner_id.to_string(),
            scores: Vec::new(),
            stats: LearnerProfile {
                proficiency_level: self.tracker.current_level(learner_id)?,
                ..LearnerProfile::default()
            },
        })
    }

    /// Apply a batch of submissions. Each learner's submissions run in order
    /// on one blocking task; up to `parallelism` learners run at once.
    pub async fn replay(
        self: &Arc<Self>,
        submissions: Vec<Submission>,
        parallelism: usize,
        progress: &dyn ProgressReporter,
    ) -> Result<ReplayOutcome> {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

        let start = Instant::now();
        let total = submissions.len();
        let semaphore = Arc::new(Semaphore::new(parallelism));

        let mut by_learner: IndexMap<String, Vec<Vec<ScoreRecord>>> = IndexMap::new();
        for s in submissions {
            by_learner.entry(s.learner_id).or_default().push(s.scores);
        }
        let order: Vec<String> = by_learner.keys().cloned().collect();

        let mut futures = FuturesUnordered::new();
        for (learner_id, batches) in by_learner {
            progress.on_learner_start(&learner_id, batches.len());

            let engine = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let id = learner_id.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    let results = tokio::task::spawn_blocking(move || {
                        batches
                            .into_iter()
                            .map(|scores| engine.submit_scores(&id, scores))
                            .collect::<Vec<_>>()
                    })
                    .await?;
                    anyhow::Ok(results)
                };
                let outcome = inner.await;
                (learner_id, outcome)
            });
        }

        let mut latest: HashMap<String, LearnerProfile> = HashMap::new();
        let mut completed = 0usize;
        let mut failed = 0usize;

        while let Some((learner_id, outcome)) = futures.next().await {
            match outcome {
                Ok(results) => {
                    for result in results {
                        match result {
                            Ok(profile) => {
                                progress.on_submission_complete(&learner_id, &profile);
                                latest.insert(learner_id.clone(), profile);
                                completed += 1;
                            }
                            Err(e) => {
                                tracing::warn!("submission for {learner_id} rejected: {e}");
                                progress.on_submission_error(&learner_id, &e.to_string());
                                failed += 1;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("replay failed for {learner_id}: {e:#}");
                    progress.on_submission_error(&learner_id, &e.to_string());
                    failed += 1;
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_replay_complete(total, completed, failed, elapsed);

        let profiles = order
            .into_iter()
            .filter_map(|id| latest.remove(&id).map(|p| (id, p)))
            .collect();

        Ok(ReplayOutcome {
            profiles,
            completed,
            failed,
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    fn state_for(&self, learner_id: &str) -> Arc<Mutex<LearnerState>> {
        Arc::clone(
            self.learners
                .entry(learner_id.to_string())
                .or_default()
                .value(),
        )
    }
}
