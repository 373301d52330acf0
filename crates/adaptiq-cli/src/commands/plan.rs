//! The `adaptiq plan` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use adaptiq_core::complexity::Complexity;
use adaptiq_core::engine::{AdaptiveEngine, DifficultySource, QuizRequest};
use adaptiq_store::config::{create_store, load_config_from};

pub fn execute(
    scores_path: PathBuf,
    learner: String,
    chapter_text_path: Option<PathBuf>,
    chapter: Option<String>,
    preference: Option<f64>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config.store)?;
    let engine = AdaptiveEngine::new(store, config.engine_config())?;

    let past_scores: Vec<_> = super::load_histories(&scores_path)?
        .iter()
        .flat_map(|h| h.for_learner(&learner))
        .collect();
    if past_scores.is_empty() {
        tracing::warn!("no scores found for learner {learner}");
    }

    let chapter_text = chapter_text_path
        .map(|p| {
            std::fs::read_to_string(&p)
                .with_context(|| format!("failed to read chapter text: {}", p.display()))
        })
        .transpose()?;

    let request = QuizRequest {
        learner_id: learner,
        chapter_text,
        chapter,
        past_scores,
        difficulty_preference: preference,
    };
    let plan = engine.plan_quiz(&request)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Learner: {}", plan.learner_id);
    println!("Proficiency: {:.3}", plan.proficiency);
    match &plan.complexity {
        Complexity::Computed { value } => println!("Complexity: {value:.3}"),
        Complexity::Defaulted { reason } => {
            println!("Complexity: {:.3} (default: {reason})", plan.complexity.value())
        }
    }
    let source = match plan.difficulty_source {
        DifficultySource::Blended => "blended",
        DifficultySource::Preference => "learner preference",
    };
    println!("Difficulty: {:.3} ({source})", plan.difficulty);

    if plan.recommended_topics.is_empty() {
        println!("No topics need remediation.");
    } else {
        println!("Recommended topics:");
        for r in &plan.recommended_topics {
            println!(
                "  [{}] {} ({:.1}%)",
                r.priority,
                r.topic,
                r.proficiency * 100.0
            );
        }
    }

    Ok(())
}
