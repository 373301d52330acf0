//! adaptiq CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "adaptiq",
    version,
    about = "Adaptive quiz difficulty and learner analytics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize performance by topic and chapter
    Analyze {
        /// Path to a score file (.toml/.json) or directory
        #[arg(long)]
        scores: PathBuf,

        /// Only analyze this learner's records
        #[arg(long)]
        learner: Option<String>,

        /// Only analyze records from this chapter
        #[arg(long)]
        chapter: Option<String>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Save the report as JSON to this path
        #[arg(long)]
        save: Option<PathBuf>,

        /// Write an HTML report to this path
        #[arg(long)]
        html: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Plan the difficulty of a learner's next quiz
    Plan {
        /// Path to a score file (.toml/.json) or directory
        #[arg(long)]
        scores: PathBuf,

        /// Learner to plan for
        #[arg(long)]
        learner: String,

        /// Text file with the chapter the quiz is generated from
        #[arg(long)]
        chapter_text: Option<PathBuf>,

        /// Restrict recommendations to this chapter
        #[arg(long)]
        chapter: Option<String>,

        /// Use this difficulty instead of the blended one
        #[arg(long)]
        preference: Option<f64>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Replay recorded quizzes through the proficiency tracker
    Replay {
        /// Path to a score file (.toml/.json) or directory
        #[arg(long)]
        scores: PathBuf,

        /// Split each learner's records into quizzes of this many answers
        #[arg(long, default_value = "10")]
        quiz_size: usize,

        /// Max learners replayed concurrently (overrides config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two saved analytics reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Minimum proficiency change counted as a regression or improvement
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate score files
    Validate {
        /// Path to a score file or directory
        #[arg(long)]
        scores: PathBuf,
    },

    /// Create starter config and example score file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adaptiq=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            scores,
            learner,
            chapter,
            format,
            save,
            html,
            config,
        } => commands::analyze::execute(scores, learner, chapter, format, save, html, config),
        Commands::Plan {
            scores,
            learner,
            chapter_text,
            chapter,
            preference,
            format,
            config,
        } => commands::plan::execute(
            scores,
            learner,
            chapter_text,
            chapter,
            preference,
            format,
            config,
        ),
        Commands::Replay {
            scores,
            quiz_size,
            parallelism,
            format,
            config,
        } => commands::replay::execute(scores, quiz_size, parallelism, format, config).await,
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Validate { scores } => commands::validate::execute(scores),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
