//! The `adaptiq analyze` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use adaptiq_core::analyzer::PerformanceAnalyzer;
use adaptiq_core::report::AnalyticsReport;
use adaptiq_report::html::write_html_report;
use adaptiq_store::config::load_config_from;

pub fn execute(
    scores_path: PathBuf,
    learner: Option<String>,
    chapter: Option<String>,
    format: String,
    save: Option<PathBuf>,
    html: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let analyzer = PerformanceAnalyzer::new(config.analyzer.clone());

    let histories = super::load_histories(&scores_path)?;
    if histories.len() > 1 && (save.is_some() || html.is_some()) {
        anyhow::bail!(
            "--save and --html need a single score file, {} loaded from {}",
            histories.len(),
            scores_path.display()
        );
    }

    let reports: Vec<AnalyticsReport> = histories
        .iter()
        .map(|h| AnalyticsReport::build(&analyzer, h, learner.as_deref(), chapter.as_deref()))
        .collect();

    match format.as_str() {
        "json" => {
            if reports.len() == 1 {
                println!("{}", serde_json::to_string_pretty(&reports[0])?);
            } else {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
        }
        "markdown" | "md" => {
            for report in &reports {
                println!("{}", to_markdown(report));
            }
        }
        _ => {
            for report in &reports {
                print_report(report);
            }
        }
    }

    if let Some(path) = &save {
        reports[0].save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }
    if let Some(path) = &html {
        write_html_report(&reports[0], path)?;
        eprintln!("HTML report: {}", path.display());
    }

    Ok(())
}

fn scope(report: &AnalyticsReport) -> String {
    let mut parts = Vec::new();
    if let Some(l) = &report.learner_id {
        parts.push(format!("learner {l}"));
    }
    if let Some(c) = &report.chapter {
        parts.push(format!("chapter {c}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" [{}]", parts.join(", "))
    }
}

fn print_report(report: &AnalyticsReport) {
    let summary = &report.summary;
    println!(
        "{}{}: {} records",
        report.source.name,
        scope(report),
        report.record_count
    );

    if summary.is_empty() {
        println!("No scores recorded.\n");
        return;
    }

    println!(
        "Overall proficiency: {:.1}%",
        summary.overall_proficiency * 100.0
    );
    if let Some(weakest) = &summary.weakest_topic {
        println!("Weakest topic: {weakest}");
    }

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Attempts", "Correct", "Proficiency"]);
    for t in &summary.topics {
        table.add_row(vec![
            Cell::new(&t.topic),
            Cell::new(t.attempts),
            Cell::new(t.correct),
            Cell::new(format!("{:.1}%", t.proficiency * 100.0)),
        ]);
    }
    println!("{table}");

    if !summary.chapter_stats.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Chapter", "Attempts", "Correct", "Proficiency"]);
        for (chapter, stats) in &summary.chapter_stats {
            table.add_row(vec![
                Cell::new(chapter),
                Cell::new(stats.attempts),
                Cell::new(stats.correct),
                Cell::new(format!("{:.1}%", stats.proficiency * 100.0)),
            ]);
        }
        println!("{table}");
    }

    if summary.recommendations.is_empty() {
        println!("No topics need remediation.");
    } else {
        println!("Recommended practice:");
        for r in &summary.recommendations {
            println!(
                "  [{}] {} ({:.1}%)",
                r.priority,
                r.topic,
                r.proficiency * 100.0
            );
        }
    }
    println!();
}

fn to_markdown(report: &AnalyticsReport) -> String {
    let summary = &report.summary;
    let mut md = format!("## {}{}\n\n", report.source.name, scope(report));

    if summary.is_empty() {
        md.push_str("No scores recorded.\n");
        return md;
    }

    md.push_str(&format!(
        "**Overall proficiency:** {:.1}% across {} records\n\n",
        summary.overall_proficiency * 100.0,
        report.record_count
    ));

    md.push_str("| Topic | Attempts | Correct | Proficiency |\n");
    md.push_str("|-------|----------|---------|-------------|\n");
    for t in &summary.topics {
        md.push_str(&format!(
            "| {} | {} | {} | {:.1}% |\n",
            t.topic,
            t.attempts,
            t.correct,
            t.proficiency * 100.0
        ));
    }
    md.push('\n');

    if !summary.recommendations.is_empty() {
        md.push_str("### Recommended practice\n\n");
        for r in &summary.recommendations {
            md.push_str(&format!(
                "- **{}** {} ({:.1}%)\n",
                r.priority,
                r.topic,
                r.proficiency * 100.0
            ));
        }
    }

    md
}
