//! Analytics report types with JSON persistence and progress comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyzer::{PerformanceAnalyzer, Summary};
use crate::model::ScoreHistory;

/// A saved analysis of one score history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Which history was analyzed.
    pub source: HistorySummary,
    /// Learner filter applied before analysis, if any.
    #[serde(default)]
    pub learner_id: Option<String>,
    /// Chapter filter applied before analysis, if any.
    #[serde(default)]
    pub chapter: Option<String>,
    /// Number of records analyzed after filtering.
    pub record_count: usize,
    /// The analysis itself.
    pub summary: Summary,
}

/// Summary of a score history (without the records).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub id: String,
    pub name: String,
    pub learners: usize,
}

impl AnalyticsReport {
    /// Analyze `history`, optionally narrowed to one learner and one chapter.
    pub fn build(
        analyzer: &PerformanceAnalyzer,
        history: &ScoreHistory,
        learner_id: Option<&str>,
        chapter: Option<&str>,
    ) -> Self {
        let records: Vec<_> = history
            .scores
            .iter()
            .filter(|s| learner_id.map_or(true, |l| s.learner_id == l))
            .filter(|s| chapter.map_or(true, |c| s.chapter.as_deref() == Some(c)))
            .cloned()
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: HistorySummary {
                id: history.id.clone(),
                name: history.name.clone(),
                learners: history.learners().len(),
            },
            learner_id: learner_id.map(str::to_string),
            chapter: chapter.map(str::to_string),
            record_count: records.len(),
            summary: analyzer.analyze(&records),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AnalyticsReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline to track per-topic progress.
    pub fn compare(&self, baseline: &AnalyticsReport, threshold: f64) -> ProgressReport {
        let topic_map = |report: &AnalyticsReport| -> HashMap<String, f64> {
            report
                .summary
                .topics
                .iter()
                .map(|t| (t.topic.clone(), t.proficiency))
                .collect()
        };

        let baseline_topics = topic_map(baseline);
        let current_topics = topic_map(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_topics = 0usize;

        // Walk in the current report's ranking so output is weakest first.
        for t in &self.summary.topics {
            let current = t.proficiency;
            let Some(&baseline_val) = baseline_topics.get(&t.topic) else {
                new_topics += 1;
                continue;
            };
            let change = TopicChange {
                topic: t.topic.clone(),
                baseline_proficiency: baseline_val,
                current_proficiency: current,
                delta: current - baseline_val,
            };
            if change.delta < -threshold {
                regressions.push(change);
            } else if change.delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let dropped_topics = baseline_topics
            .keys()
            .filter(|k| !current_topics.contains_key(*k))
            .count();

        ProgressReport {
            overall_delta: self.summary.overall_proficiency - baseline.summary.overall_proficiency,
            regressions,
            improvements,
            unchanged,
            new_topics,
            dropped_topics,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Change in overall proficiency.
    pub overall_delta: f64,
    /// Topics whose proficiency went down.
    pub regressions: Vec<TopicChange>,
    /// Topics whose proficiency went up.
    pub improvements: Vec<TopicChange>,
    /// Topics with no significant change.
    pub unchanged: usize,
    /// Topics in current but not baseline.
    pub new_topics: usize,
    /// Topics in baseline but not current.
    pub dropped_topics: usize,
}

/// A topic whose proficiency moved beyond the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicChange {
    pub topic: String,
    pub baseline_proficiency: f64,
    pub current_proficiency: f64,
    pub delta: f64,
}

impl ProgressReport {
    /// Format the progress report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged (overall {:+.1}%)\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged,
            self.overall_delta * 100.0
        ));

        for (title, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Topic | Baseline | Current | Delta |\n");
            md.push_str("|-------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:+.1}% |\n",
                    c.topic,
                    c.baseline_proficiency * 100.0,
                    c.current_proficiency * 100.0,
                    c.delta * 100.0
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any topic regressed.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
