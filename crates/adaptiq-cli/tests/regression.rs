//! Progress comparison tests.
//!
//! Builds analytics reports from synthetic score histories and checks that
//! comparing them flags the right topics.

use adaptiq_core::analyzer::PerformanceAnalyzer;
use adaptiq_core::model::{ScoreHistory, ScoreRecord};
use adaptiq_core::report::AnalyticsReport;

fn answers(topic: &str, correct: usize, wrong: usize) -> Vec<ScoreRecord> {
    (0..correct)
        .map(|_| ScoreRecord::new("alice", topic, true))
        .chain((0..wrong).map(|_| ScoreRecord::new("alice", topic, false)))
        .collect()
}

fn make_report(groups: Vec<Vec<ScoreRecord>>) -> AnalyticsReport {
    let history = ScoreHistory {
        id: "term".into(),
        name: "Term".into(),
        description: String::new(),
        scores: groups.into_iter().flatten().collect(),
    };
    AnalyticsReport::build(&PerformanceAnalyzer::default(), &history, None, None)
}

#[test]
fn detect_regression_when_topic_slips() {
    let baseline = make_report(vec![answers("algebra", 3, 0), answers("sets", 4, 0)]);
    let current = make_report(vec![
        answers("algebra", 1, 2), // regression
        answers("sets", 4, 0),    // same
    ]);

    let report = current.compare(&baseline, 0.05);

    assert!(report.has_regressions());
    assert_eq!(report.regressions.len(), 1);
    assert_eq!(report.regressions[0].topic, "algebra");
    assert!(report.regressions[0].delta < 0.0);
    assert_eq!(report.unchanged, 1);
}

#[test]
fn detect_regression_to_zero() {
    let baseline = make_report(vec![answers("algebra", 3, 0)]);
    let current = make_report(vec![answers("algebra", 0, 3)]);

    let report = current.compare(&baseline, 0.05);

    assert!(report.has_regressions());
    assert_eq!(report.regressions[0].current_proficiency, 0.0);
    assert!((report.overall_delta + 1.0).abs() < 1e-9);
}

#[test]
fn detect_improvement() {
    let baseline = make_report(vec![answers("algebra", 1, 2)]);
    let current = make_report(vec![answers("algebra", 3, 0)]);

    let report = current.compare(&baseline, 0.05);

    assert!(!report.has_regressions());
    assert_eq!(report.improvements.len(), 1);
    assert!(report.improvements[0].delta > 0.0);
}

#[test]
fn small_changes_stay_within_threshold() {
    // 9/10 -> 8/10 is a 10 point drop.
    let baseline = make_report(vec![answers("algebra", 9, 1)]);
    let current = make_report(vec![answers("algebra", 8, 2)]);

    assert!(current.compare(&baseline, 0.05).has_regressions());
    assert!(!current.compare(&baseline, 0.15).has_regressions());
    assert_eq!(current.compare(&baseline, 0.15).unchanged, 1);
}

#[test]
fn no_change_with_identical_results() {
    let baseline = make_report(vec![answers("algebra", 3, 0), answers("sets", 2, 2)]);

    let report = baseline.compare(&baseline, 0.05);

    assert!(!report.has_regressions());
    assert!(report.improvements.is_empty());
    assert_eq!(report.unchanged, 2);
}

#[test]
fn detect_new_and_dropped_topics() {
    let baseline = make_report(vec![answers("old_topic", 3, 0), answers("shared", 2, 0)]);
    let current = make_report(vec![answers("shared", 2, 0), answers("new_topic", 5, 0)]);

    let report = current.compare(&baseline, 0.05);

    assert_eq!(report.new_topics, 1);
    assert_eq!(report.dropped_topics, 1);
    assert_eq!(report.unchanged, 1);
}

#[test]
fn regressions_listed_weakest_first() {
    let baseline = make_report(vec![
        answers("algebra", 4, 0),
        answers("geometry", 4, 0),
        answers("fractions", 4, 0),
    ]);
    let current = make_report(vec![
        answers("algebra", 2, 2),
        answers("geometry", 0, 4),
        answers("fractions", 4, 0),
    ]);

    let report = current.compare(&baseline, 0.05);
    let topics: Vec<_> = report.regressions.iter().map(|c| c.topic.as_str()).collect();
    assert_eq!(topics, ["geometry", "algebra"]);
    assert!(report.to_markdown().contains("| geometry | 100.0% | 0.0% | -100.0% |"));
}
