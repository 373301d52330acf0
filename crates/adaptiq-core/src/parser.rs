//! Score file parser.
//!
//! Loads score histories from TOML or JSON files and directories, and
//! validates them. This is the boundary where records are checked once;
//! the analytic components trust what they receive.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{ScoreHistory, ScoreRecord};

/// Intermediate structure shared by the TOML and JSON file shapes.
#[derive(Debug, Deserialize)]
struct ScoreFile {
    history: ScoreFileHeader,
    #[serde(default)]
    scores: Vec<FileScore>,
}

#[derive(Debug, Deserialize)]
struct ScoreFileHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    /// Applied to records that do not name a learner.
    #[serde(default)]
    learner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileScore {
    #[serde(default)]
    learner_id: Option<String>,
    topic: String,
    #[serde(default)]
    chapter: Option<String>,
    correct: bool,
    #[serde(default)]
    difficulty: Option<f64>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// JSON files may also be a bare array of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonScoreFile {
    Full(ScoreFile),
    Records(Vec<ScoreRecord>),
}

/// Parse a single `.toml` or `.json` score file.
pub fn parse_score_file(path: &Path) -> Result<ScoreHistory> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read score file: {}", path.display()))?;

    if is_json(path) {
        parse_score_json_str(&content, path)
    } else {
        parse_score_toml_str(&content, path)
    }
}

/// Parse a TOML string into a `ScoreHistory` (useful for testing).
pub fn parse_score_toml_str(content: &str, source_path: &Path) -> Result<ScoreHistory> {
    let parsed: ScoreFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    build_history(parsed, source_path)
}

/// Parse a JSON string into a `ScoreHistory`.
pub fn parse_score_json_str(content: &str, source_path: &Path) -> Result<ScoreHistory> {
    let parsed: JsonScoreFile = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;

    match parsed {
        JsonScoreFile::Full(file) => build_history(file, source_path),
        JsonScoreFile::Records(scores) => {
            let stem = source_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scores".to_string());
            Ok(ScoreHistory {
                id: stem.clone(),
                name: stem,
                description: String::new(),
                scores,
            })
        }
    }
}

fn build_history(file: ScoreFile, source_path: &Path) -> Result<ScoreHistory> {
    let default_learner = file.history.learner_id;

    let scores = file
        .scores
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let learner_id = s
                .learner_id
                .or_else(|| default_learner.clone())
                .with_context(|| {
                    format!(
                        "score #{} in {} has no learner_id and the history sets none",
                        i + 1,
                        source_path.display()
                    )
                })?;
            Ok(ScoreRecord {
                learner_id,
                topic: s.topic,
                chapter: s.chapter,
                correct: s.correct,
                difficulty: s.difficulty,
                timestamp: s.timestamp,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScoreHistory {
        id: file.history.id,
        name: file.history.name,
        description: file.history.description,
        scores,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn is_score_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml" || ext == "json")
}

/// Recursively load all score files from a directory.
pub fn load_score_directory(dir: &Path) -> Result<Vec<ScoreHistory>> {
    let mut histories = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            histories.extend(load_score_directory(&path)?);
        } else if is_score_file(&path) {
            match parse_score_file(&path) {
                Ok(history) => histories.push(history),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(histories)
}

/// Load a file, or every score file under a directory.
pub fn load_scores(path: &Path) -> Result<Vec<ScoreHistory>> {
    if path.is_dir() {
        load_score_directory(path)
    } else {
        Ok(vec![parse_score_file(path)?])
    }
}

/// A warning from score history validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based position of the offending record (if applicable).
    pub record: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a score history for common issues.
pub fn validate_history(history: &ScoreHistory) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if history.scores.is_empty() {
        warnings.push(ValidationWarning {
            record: None,
            message: "history has no scores".into(),
        });
    }

    let mut last_seen: HashMap<&str, DateTime<Utc>> = HashMap::new();

    for (i, s) in history.scores.iter().enumerate() {
        let record = Some(i + 1);

        if s.learner_id.trim().is_empty() {
            warnings.push(ValidationWarning {
                record,
                message: "learner_id is empty".into(),
            });
        }

        if s.topic.trim().is_empty() {
            warnings.push(ValidationWarning {
                record,
                message: "topic is empty".into(),
            });
        }

        if s.chapter.as_deref().is_some_and(|c| c.trim().is_empty()) {
            warnings.push(ValidationWarning {
                record,
                message: "chapter is present but empty".into(),
            });
        }

        if let Some(d) = s.difficulty {
            if !(0.0..=1.0).contains(&d) {
                warnings.push(ValidationWarning {
                    record,
                    message: format!("difficulty {d} is outside [0, 1]"),
                });
            }
        }

        if let Some(ts) = s.timestamp {
            if let Some(prev) = last_seen.insert(s.learner_id.as_str(), ts) {
                if ts < prev {
                    warnings.push(ValidationWarning {
                        record,
                        message: format!(
                            "timestamp {} is earlier than the previous record for {}",
                            ts.to_rfc3339(),
                            s.learner_id
                        ),
                    });
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[history]
id = "class7-maths"
name = "Class 7 Maths"
description = "Term one quizzes"

[[scores]]
learner_id = "alice"
topic = "algebra"
chapter = "Simple Equations"
correct = false
difficulty = 0.4
timestamp = "2026-03-01T09:00:00Z"

[[scores]]
learner_id = "alice"
topic = "algebra"
chapter = "Simple Equations"
correct = true
timestamp = "2026-03-01T09:01:00Z"

[[scores]]
learner_id = "bob"
topic = "geometry"
correct = true
"#;

    #[test]
    fn parse_valid_toml() {
        let history = parse_score_toml_str(VALID_TOML, &PathBuf::from("t.toml")).unwrap();
        assert_eq!(history.id, "class7-maths");
        assert_eq!(history.name, "Class 7 Maths");
        assert_eq!(history.scores.len(), 3);
        assert_eq!(history.scores[0].chapter.as_deref(), Some("Simple Equations"));
        assert_eq!(history.scores[0].difficulty, Some(0.4));
        assert!(history.scores[0].timestamp.is_some());
        assert!(history.scores[2].chapter.is_none());
        assert!(validate_history(&history).is_empty());
    }

    #[test]
    fn header_learner_fills_missing_ids() {
        let toml = r#"
[history]
id = "solo"
name = "Solo"
learner_id = "carol"

[[scores]]
topic = "fractions"
correct = true

[[scores]]
learner_id = "dave"
topic = "fractions"
correct = false
"#;
        let history = parse_score_toml_str(toml, &PathBuf::from("t.toml")).unwrap();
        assert_eq!(history.scores[0].learner_id, "carol");
        assert_eq!(history.scores[1].learner_id, "dave");
    }

    #[test]
    fn missing_learner_is_an_error() {
        let toml = r#"
[history]
id = "x"
name = "X"

[[scores]]
topic = "fractions"
correct = true
"#;
        let err = parse_score_toml_str(toml, &PathBuf::from("t.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("no learner_id"));
    }

    #[test]
    fn parse_json_forms() {
        let full = r#"{"history":{"id":"j","name":"J"},"scores":[{"learner_id":"a","topic":"t","correct":true}]}"#;
        let h = parse_score_json_str(full, &PathBuf::from("j.json")).unwrap();
        assert_eq!(h.id, "j");
        assert_eq!(h.scores.len(), 1);

        let bare = r#"[{"learner_id":"a","topic":"t","correct":false,"chapter":"c1"}]"#;
        let h = parse_score_json_str(bare, &PathBuf::from("week1.json")).unwrap();
        assert_eq!(h.id, "week1");
        assert_eq!(h.scores[0].chapter.as_deref(), Some("c1"));
    }

    #[test]
    fn validate_flags_bad_records() {
        let toml = r#"
[history]
id = "bad"
name = "Bad"

[[scores]]
learner_id = "alice"
topic = ""
correct = true
difficulty = 1.4
timestamp = "2026-03-02T09:00:00Z"

[[scores]]
learner_id = "alice"
topic = "sets"
chapter = " "
correct = true
timestamp = "2026-03-01T09:00:00Z"
"#;
        let history = parse_score_toml_str(toml, &PathBuf::from("t.toml")).unwrap();
        let warnings = validate_history(&history);
        assert!(warnings.iter().any(|w| w.message.contains("topic is empty")));
        assert!(warnings.iter().any(|w| w.message.contains("outside [0, 1]")));
        assert!(warnings.iter().any(|w| w.message.contains("chapter is present")));
        assert!(warnings
            .iter()
            .any(|w| w.record == Some(2) && w.message.contains("earlier")));
    }

    #[test]
    fn validate_empty_history() {
        let history = ScoreHistory {
            id: "e".into(),
            name: "E".into(),
            description: String::new(),
            scores: vec![],
        };
        let warnings = validate_history(&history);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].record.is_none());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_score_toml_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "nope = [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(
            nested.join("b.json"),
            r#"[{"learner_id":"z","topic":"t","correct":true}]"#,
        )
        .unwrap();

        let histories = load_score_directory(dir.path()).unwrap();
        assert_eq!(histories.len(), 2);
        assert_eq!(histories[0].id, "class7-maths");
        assert_eq!(histories[1].id, "b");
    }
}
