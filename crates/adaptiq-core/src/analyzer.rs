//! Topic and chapter performance analysis.
//!
//! Groups a score collection by topic and by chapter, ranks topics weakest
//! first, and turns the weakest ones into remediation recommendations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{Priority, ScoreRecord};

/// Proficiency reported when there is nothing to analyze.
pub const NO_DATA_PROFICIENCY: f64 = 0.5;

/// Thresholds for turning ranked topics into recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// How many of the weakest topics are considered.
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    /// Topics at or above this proficiency are never recommended.
    #[serde(default = "default_recommend_below")]
    pub recommend_below: f64,
    /// Topics below this proficiency get high priority.
    #[serde(default = "default_high_priority_below")]
    pub high_priority_below: f64,
}

fn default_max_recommendations() -> usize {
    3
}
fn default_recommend_below() -> f64 {
    0.7
}
fn default_high_priority_below() -> f64 {
    0.5
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_recommendations: default_max_recommendations(),
            recommend_below: default_recommend_below(),
            high_priority_below: default_high_priority_below(),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.high_priority_below <= self.recommend_below,
            "analyzer.high_priority_below must not exceed analyzer.recommend_below"
        );
        Ok(())
    }
}

/// Attempts and correct answers for one topic or chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub attempts: u32,
    pub correct: u32,
    pub proficiency: f64,
}

impl GroupStats {
    fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
        self.proficiency = self.correct as f64 / self.attempts as f64;
    }
}

/// Per-topic statistics, as ranked by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicStats {
    pub topic: String,
    pub attempts: u32,
    pub correct: u32,
    pub proficiency: f64,
}

/// A weak topic flagged for remediation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub topic: String,
    pub proficiency: f64,
    pub priority: Priority,
}

/// Result of analyzing a score collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The lowest-ranked topic; `None` when there is no data.
    pub weakest_topic: Option<String>,
    /// Mean of per-topic proficiencies (each topic weighted equally).
    #[serde(alias = "proficiency_level")]
    pub overall_proficiency: f64,
    /// Weakest topics below the recommendation threshold, weakest first.
    pub recommendations: Vec<Recommendation>,
    /// Per-chapter totals in first-seen order.
    pub chapter_stats: IndexMap<String, GroupStats>,
    /// All topics ranked weakest first.
    #[serde(default)]
    pub topics: Vec<TopicStats>,
}

impl Summary {
    /// The summary reported for an empty score collection.
    pub fn no_data() -> Self {
        Self {
            weakest_topic: None,
            overall_proficiency: NO_DATA_PROFICIENCY,
            recommendations: Vec::new(),
            chapter_stats: IndexMap::new(),
            topics: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Stats for one topic, if it was seen.
    pub fn topic(&self, name: &str) -> Option<&TopicStats> {
        self.topics.iter().find(|t| t.topic == name)
    }
}

/// Aggregates score collections into [`Summary`] values.
#[derive(Debug, Clone, Default)]
pub struct PerformanceAnalyzer {
    config: AnalyzerConfig,
}

impl PerformanceAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze `scores`. Filtering to a chapter is the caller's job.
    pub fn analyze(&self, scores: &[ScoreRecord]) -> Summary {
        if scores.is_empty() {
            return Summary::no_data();
        }

        let topics = rank_topics(group_by_topic(scores));

        let overall_proficiency =
            topics.iter().map(|t| t.proficiency).sum::<f64>() / topics.len() as f64;

        let recommendations = topics
            .iter()
            .take(self.config.max_recommendations)
            .filter(|t| t.proficiency < self.config.recommend_below)
            .map(|t| Recommendation {
                topic: t.topic.clone(),
                proficiency: t.proficiency,
                priority: if t.proficiency < self.config.high_priority_below {
                    Priority::High
                } else {
                    Priority::Medium
                },
            })
            .collect();

        Summary {
            weakest_topic: topics.first().map(|t| t.topic.clone()),
            overall_proficiency,
            recommendations,
            chapter_stats: group_by_chapter(scores),
            topics,
        }
    }
}

/// Topic totals in first-seen order.
pub fn group_by_topic(scores: &[ScoreRecord]) -> IndexMap<String, GroupStats> {
    let mut grouped: IndexMap<String, GroupStats> = IndexMap::new();
    for s in scores {
        grouped
            .entry(s.topic.clone())
            .or_insert(GroupStats {
                attempts: 0,
                correct: 0,
                proficiency: 0.0,
            })
            .record(s.correct);
    }
    grouped
}

/// Chapter totals in first-seen order; records without a chapter are skipped.
pub fn group_by_chapter(scores: &[ScoreRecord]) -> IndexMap<String, GroupStats> {
    let mut grouped: IndexMap<String, GroupStats> = IndexMap::new();
    for s in scores {
        let Some(chapter) = &s.chapter else {
            continue;
        };
        grouped
            .entry(chapter.clone())
            .or_insert(GroupStats {
                attempts: 0,
                correct: 0,
                proficiency: 0.0,
            })
            .record(s.correct);
    }
    grouped
}

/// Sort weakest first. `sort_by` is stable, so equal proficiencies keep
/// first-seen order.
fn rank_topics(grouped: IndexMap<String, GroupStats>) -> Vec<TopicStats> {
    let mut topics: Vec<TopicStats> = grouped
        .into_iter()
        .map(|(topic, g)| TopicStats {
            topic,
            attempts: g.attempts,
            correct: g.correct,
            proficiency: g.proficiency,
        })
        .collect();
    topics.sort_by(|a, b| a.proficiency.total_cmp(&b.proficiency));
    topics
}
