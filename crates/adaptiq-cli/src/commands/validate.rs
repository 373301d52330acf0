//! The `adaptiq validate` command.

use std::path::PathBuf;

use anyhow::Result;

use adaptiq_core::parser;

pub fn execute(scores_path: PathBuf) -> Result<()> {
    let histories = super::load_histories(&scores_path)?;

    let mut total_warnings = 0;

    for history in &histories {
        println!(
            "Score file: {} ({} records, {} learners)",
            history.name,
            history.scores.len(),
            history.learners().len()
        );

        let warnings = parser::validate_history(history);
        for w in &warnings {
            let prefix = w
                .record
                .map(|n| format!("  [#{n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All score files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
