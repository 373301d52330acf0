//! The `adaptiq replay` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};

use adaptiq_core::engine::{AdaptiveEngine, ProgressReporter, ReplayOutcome, Submission};
use adaptiq_core::model::{LearnerProfile, ScoreHistory};
use adaptiq_store::config::{create_store, load_config_from};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_learner_start(&self, learner_id: &str, submissions: usize) {
        eprintln!("  Starting: {learner_id} ({submissions} quizzes)");
    }

    fn on_submission_complete(&self, learner_id: &str, profile: &LearnerProfile) {
        eprintln!(
            "  Done: {} quiz {} ({}/{} correct) level {:.3}",
            learner_id,
            profile.completed_quizzes,
            profile.total_correct,
            profile.total_questions,
            profile.proficiency_level,
        );
    }

    fn on_submission_error(&self, learner_id: &str, error: &str) {
        eprintln!("  ERROR: {learner_id}: {error}");
    }

    fn on_replay_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} quizzes applied, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    scores_path: PathBuf,
    quiz_size: usize,
    parallelism: Option<usize>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(quiz_size >= 1, "quiz size must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let histories = super::load_histories(&scores_path)?;
    let submissions = to_submissions(&histories, quiz_size);

    let store = create_store(&config.store)?;
    let engine = Arc::new(AdaptiveEngine::new(store, config.engine_config())?);

    eprintln!(
        "adaptiq v{}: replaying {} quizzes from {} file(s) using the {} store",
        env!("CARGO_PKG_VERSION"),
        submissions.len(),
        histories.len(),
        engine.tracker().store().name()
    );
    eprintln!();

    let outcome = engine
        .replay(submissions, parallelism, &ConsoleReporter)
        .await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }

    Ok(())
}

/// Split each learner's records into consecutive quizzes, file by file.
fn to_submissions(histories: &[ScoreHistory], quiz_size: usize) -> Vec<Submission> {
    let mut submissions = Vec::new();
    for history in histories {
        for learner_id in history.learners() {
            let records = history.for_learner(&learner_id);
            for chunk in records.chunks(quiz_size) {
                submissions.push(Submission {
                    learner_id: learner_id.clone(),
                    scores: chunk.to_vec(),
                });
            }
        }
    }
    submissions
}

fn print_summary(outcome: &ReplayOutcome) {
    let mut table = Table::new();
    table.set_header(vec!["Learner", "Quizzes", "Correct", "Questions", "Level"]);

    for (learner_id, profile) in &outcome.profiles {
        table.add_row(vec![
            Cell::new(learner_id),
            Cell::new(profile.completed_quizzes),
            Cell::new(profile.total_correct),
            Cell::new(profile.total_questions),
            Cell::new(format!("{:.3}", profile.proficiency_level)),
        ]);
    }

    println!("{table}");
}
