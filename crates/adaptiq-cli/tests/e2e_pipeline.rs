//! End-to-end pipeline tests across the workspace crates.
//!
//! These tests verify that the pipeline (parse → track → plan → report)
//! holds together with a file-backed store, as the CLI wires it.

use std::path::PathBuf;
use std::sync::Arc;

use adaptiq_core::engine::{AdaptiveEngine, NoopReporter, QuizRequest, Submission};
use adaptiq_core::error::EngineError;
use adaptiq_core::model::{Priority, ScoreRecord};
use adaptiq_core::parser::parse_score_file;
use adaptiq_core::report::AnalyticsReport;
use adaptiq_core::traits::ProficiencyStore;
use adaptiq_report::html::generate_html;
use adaptiq_store::config::{create_store, parse_config_str};
use adaptiq_store::{JsonFileStore, MemoryStore};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../score-sets")
        .join(name)
}

fn engine_with(store: Arc<dyn ProficiencyStore>) -> AdaptiveEngine {
    let config = parse_config_str("").unwrap();
    AdaptiveEngine::new(store, config.engine_config()).unwrap()
}

#[test]
fn e2e_plan_from_fixture() {
    let history = parse_score_file(&fixture("example.toml")).unwrap();
    let engine = engine_with(Arc::new(MemoryStore::new()));

    let plan = engine
        .plan_quiz(&QuizRequest {
            learner_id: "bob".into(),
            chapter_text: None,
            chapter: None,
            past_scores: history.for_learner("bob"),
            difficulty_preference: None,
        })
        .unwrap();

    // bob: 5 of 8 correct
    assert!((plan.proficiency - (0.35 + 0.3 * 0.625)).abs() < 1e-9);
    assert!((plan.difficulty - (plan.proficiency + 0.5) / 2.0).abs() < 1e-9);
    let topics: Vec<_> = plan.recommended_topics.iter().map(|r| &r.topic).collect();
    assert_eq!(topics, ["geometry", "algebra"]);
    assert_eq!(plan.recommended_topics[0].priority, Priority::High);
    assert_eq!(plan.recommended_topics[1].priority, Priority::Medium);
}

#[test]
fn e2e_chapter_text_moves_difficulty() {
    let text = std::fs::read_to_string(fixture("simple-equations.txt")).unwrap();
    let engine = engine_with(Arc::new(MemoryStore::new()));

    let plan = engine
        .plan_quiz(&QuizRequest {
            learner_id: "new".into(),
            chapter_text: Some(text),
            chapter: None,
            past_scores: vec![],
            difficulty_preference: None,
        })
        .unwrap();

    assert!(!plan.complexity.is_defaulted());
    let c = plan.complexity.value();
    assert!(c > 0.0 && c < 1.0);
    assert!((plan.difficulty - (0.5 + c) / 2.0).abs() < 1e-9);
    assert!(plan.recommended_topics.is_empty());
}

#[test]
fn e2e_submissions_persist_through_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("levels.json");

    {
        let engine = engine_with(Arc::new(JsonFileStore::open(&path).unwrap()));
        let quiz = vec![
            ScoreRecord::new("alice", "algebra", true),
            ScoreRecord::new("alice", "algebra", true),
            ScoreRecord::new("alice", "geometry", false),
            ScoreRecord::new("alice", "geometry", true),
        ];
        let profile = engine.submit_scores("alice", quiz).unwrap();
        assert_eq!(profile.completed_quizzes, 1);
        assert_eq!(profile.total_correct, 3);
        assert!((profile.proficiency_level - (0.35 + 0.3 * 0.75)).abs() < 1e-9);
    }

    // A fresh engine knows no history but reads the persisted level.
    let engine = engine_with(Arc::new(JsonFileStore::open(&path).unwrap()));
    let scores = engine.learner_scores("alice").unwrap();
    assert!(scores.scores.is_empty());
    assert_eq!(scores.stats.completed_quizzes, 0);
    assert!((scores.stats.proficiency_level - 0.575).abs() < 1e-9);
}

#[test]
fn e2e_rejected_submissions() {
    let engine = engine_with(Arc::new(MemoryStore::new()));

    let err = engine.submit_scores("alice", vec![]).unwrap_err();
    assert!(matches!(err, EngineError::EmptySubmission));
    assert!(err.is_client_error());

    let err = engine
        .submit_scores("alice", vec![ScoreRecord::new("bob", "t", true)])
        .unwrap_err();
    assert!(matches!(err, EngineError::LearnerMismatch { .. }));

    let scores = engine.learner_scores("alice").unwrap();
    assert_eq!(scores.stats.proficiency_level, 0.5);
}

#[tokio::test]
async fn e2e_replay_matches_sequential_submission() {
    let history = parse_score_file(&fixture("example.toml")).unwrap();
    let submissions: Vec<Submission> = history
        .learners()
        .into_iter()
        .flat_map(|id| {
            history
                .for_learner(&id)
                .chunks(3)
                .map(|c| Submission {
                    learner_id: id.clone(),
                    scores: c.to_vec(),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let parallel = Arc::new(engine_with(Arc::new(MemoryStore::new())));
    let outcome = parallel
        .replay(submissions.clone(), 4, &NoopReporter)
        .await
        .unwrap();
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.completed, submissions.len());

    let sequential = engine_with(Arc::new(MemoryStore::new()));
    for s in submissions {
        sequential.submit_scores(&s.learner_id, s.scores).unwrap();
    }

    for (id, profile) in &outcome.profiles {
        let expected = sequential.learner_scores(id).unwrap().stats;
        assert_eq!(profile, &expected);
    }
    let ids: Vec<_> = outcome.profiles.keys().map(String::as_str).collect();
    assert_eq!(ids, ["alice", "bob"]);
}

#[test]
fn e2e_report_renders_from_fixture() {
    let history = parse_score_file(&fixture("example.toml")).unwrap();
    let engine = engine_with(create_store(&Default::default()).unwrap());

    let report = AnalyticsReport::build(engine.analyzer(), &history, None, None);
    assert_eq!(report.record_count, 18);
    assert_eq!(report.source.learners, 2);
    assert_eq!(report.summary.chapter_stats.len(), 3);

    let html = generate_html(&report);
    assert!(html.contains("Simple Equations"));
    assert!(html.contains("63.2%"));
}
