//! The `adaptiq init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("adaptiq.toml").exists() {
        println!("adaptiq.toml already exists, skipping.");
    } else {
        std::fs::write("adaptiq.toml", SAMPLE_CONFIG)?;
        println!("Created adaptiq.toml");
    }

    std::fs::create_dir_all("score-sets")?;
    let example_path = std::path::Path::new("score-sets/example.toml");
    if example_path.exists() {
        println!("score-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SCORES)?;
        println!("Created score-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: adaptiq validate --scores score-sets/example.toml");
    println!("  2. Run: adaptiq analyze --scores score-sets/example.toml");
    println!("  3. Run: adaptiq plan --scores score-sets/example.toml --learner alice");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# adaptiq configuration

# Max learners replayed concurrently by `adaptiq replay`.
parallelism = 4

[tracker]
window_size = 10
smoothing = 0.7
default_level = 0.5

[blender]
floor = 0.1
ceiling = 0.9

[analyzer]
max_recommendations = 3
recommend_below = 0.7
high_priority_below = 0.5

# Levels are kept in memory by default. To persist them between runs:
# [store]
# type = "json"
# path = "${HOME}/.local/share/adaptiq/levels.json"
[store]
type = "memory"
"#;

const EXAMPLE_SCORES: &str = r#"[history]
id = "example"
name = "Example Scores"
description = "A small score history to get started"
learner_id = "alice"

[[scores]]
topic = "algebra"
chapter = "Simple Equations"
correct = false
timestamp = "2026-03-02T09:00:00Z"

[[scores]]
topic = "algebra"
chapter = "Simple Equations"
correct = true
timestamp = "2026-03-02T09:01:00Z"

[[scores]]
topic = "geometry"
chapter = "Lines and Angles"
correct = true
timestamp = "2026-03-09T09:00:00Z"

[[scores]]
topic = "geometry"
chapter = "Lines and Angles"
correct = true
timestamp = "2026-03-09T09:01:00Z"

[[scores]]
learner_id = "bob"
topic = "algebra"
chapter = "Simple Equations"
correct = false
timestamp = "2026-03-02T10:00:00Z"
"#;
