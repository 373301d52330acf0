//! The `adaptiq compare` command.

use std::path::PathBuf;

use anyhow::Result;

use adaptiq_core::report::AnalyticsReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(
        threshold.is_finite() && threshold >= 0.0,
        "threshold must be a non-negative number"
    );

    let baseline = AnalyticsReport::load_json(&baseline_path)?;
    let current = AnalyticsReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged (overall {:+.1}%)",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged,
                report.overall_delta * 100.0
            );

            for (title, changes) in [
                ("Regressions", &report.regressions),
                ("Improvements", &report.improvements),
            ] {
                if changes.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for c in changes {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}%)",
                        c.topic,
                        c.baseline_proficiency * 100.0,
                        c.current_proficiency * 100.0,
                        c.delta * 100.0
                    );
                }
            }

            if report.new_topics > 0 {
                println!("\n{} new topic(s)", report.new_topics);
            }
            if report.dropped_topics > 0 {
                println!("{} dropped topic(s)", report.dropped_topics);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
