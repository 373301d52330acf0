//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use adaptiq_core::analyzer::TopicStats;
use adaptiq_core::model::Priority;
use adaptiq_core::report::AnalyticsReport;

/// Proficiency at or above this is drawn green.
const STRONG: f64 = 0.8;
/// Proficiency at or above this (and below `STRONG`) is drawn amber.
const FAIR: f64 = 0.5;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn band(proficiency: f64) -> &'static str {
    if proficiency >= STRONG {
        "strong"
    } else if proficiency >= FAIR {
        "fair"
    } else {
        "weak"
    }
}

/// Generate an HTML page from an analytics report.
pub fn generate_html(report: &AnalyticsReport) -> String {
    let summary = &report.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>adaptiq report: {}</title>\n",
        html_escape(&report.source.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>adaptiq report</h1>\n");
    let mut scope = String::new();
    if let Some(learner) = &report.learner_id {
        scope.push_str(&format!(" | learner <strong>{}</strong>", html_escape(learner)));
    }
    if let Some(chapter) = &report.chapter {
        scope.push_str(&format!(" | chapter <strong>{}</strong>", html_escape(chapter)));
    }
    html.push_str(&format!(
        "<p class=\"meta\">History: <strong>{}</strong> | {} records | {} learners{} | {}</p>\n",
        html_escape(&report.source.name),
        report.record_count,
        report.source.learners,
        scope,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Overview
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Overview</h2>\n");
    if summary.is_empty() {
        html.push_str("<p class=\"empty\">No scores recorded.</p>\n");
    } else {
        html.push_str(&format!(
            "<p>Overall proficiency: <strong class=\"{}\">{:.1}%</strong></p>\n",
            band(summary.overall_proficiency),
            summary.overall_proficiency * 100.0
        ));
        if let Some(weakest) = &summary.weakest_topic {
            html.push_str(&format!(
                "<p>Weakest topic: <strong>{}</strong></p>\n",
                html_escape(weakest)
            ));
        }
        html.push_str(&generate_bar_chart(&summary.topics));
    }
    html.push_str("</section>\n");

    // Recommendations
    if !summary.recommendations.is_empty() {
        html.push_str("<section class=\"recommendations\">\n");
        html.push_str("<h2>Recommended practice</h2>\n<ol>\n");
        for rec in &summary.recommendations {
            let class = match rec.priority {
                Priority::High => "high",
                Priority::Medium => "medium",
            };
            html.push_str(&format!(
                "<li><span class=\"badge {}\">{}</span> {} ({:.1}%)</li>\n",
                class,
                rec.priority,
                html_escape(&rec.topic),
                rec.proficiency * 100.0
            ));
        }
        html.push_str("</ol>\n</section>\n");
    }

    // Topics
    if !summary.topics.is_empty() {
        html.push_str("<section class=\"topics\">\n");
        html.push_str("<h2>Topics</h2>\n");
        html.push_str("<table class=\"results-table\" id=\"topics\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable('topics', 0)\">Topic</th><th onclick=\"sortTable('topics', 1)\">Attempts</th><th onclick=\"sortTable('topics', 2)\">Correct</th><th onclick=\"sortTable('topics', 3)\">Proficiency</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for t in &summary.topics {
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                band(t.proficiency),
                html_escape(&t.topic),
                t.attempts,
                t.correct,
                t.proficiency * 100.0
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Chapters
    if !summary.chapter_stats.is_empty() {
        html.push_str("<section class=\"chapters\">\n");
        html.push_str("<h2>Chapters</h2>\n");
        html.push_str("<table class=\"results-table\" id=\"chapters\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable('chapters', 0)\">Chapter</th><th onclick=\"sortTable('chapters', 1)\">Attempts</th><th onclick=\"sortTable('chapters', 2)\">Correct</th><th onclick=\"sortTable('chapters', 3)\">Proficiency</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (chapter, stats) in &summary.chapter_stats {
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                band(stats.proficiency),
                html_escape(chapter),
                stats.attempts,
                stats.correct,
                stats.proficiency * 100.0
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AnalyticsReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of per-topic proficiency, weakest first.
fn generate_bar_chart(topics: &[TopicStats]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    let total_height = topics.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\" role=\"img\" aria-label=\"Topic proficiency\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, t) in topics.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (t.proficiency.clamp(0.0, 1.0) * max_width as f64) as usize;

        let color = match band(t.proficiency) {
            "strong" => "#22c55e",
            "fair" => "#eab308",
            _ => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&t.topic)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            t.proficiency * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --strong: #dcfce7; --fair: #fef9c3; --weak: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --strong: #064e3b; --fair: #713f12; --weak: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .empty { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.strong { background: var(--strong); }
.fair { background: var(--fair); }
.weak { background: var(--weak); }
.badge { display: inline-block; min-width: 4.5rem; padding: 0.1rem 0.5rem; border-radius: 4px; font-size: 0.8rem; text-transform: uppercase; text-align: center; }
.badge.high { background: #ef4444; color: #fff; }
.badge.medium { background: #eab308; color: #1a1a1a; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = isNaN(na) || isNaN(nb) ? va.localeCompare(vb) : na - nb;
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
