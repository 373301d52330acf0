//! Configuration loading and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use adaptiq_core::analyzer::AnalyzerConfig;
use adaptiq_core::blend::BlenderConfig;
use adaptiq_core::engine::EngineConfig;
use adaptiq_core::proficiency::TrackerConfig;
use adaptiq_core::traits::ProficiencyStore;

use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;

/// Where learner proficiency levels are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Levels live only as long as the process.
    #[default]
    Memory,
    /// Levels are persisted to a JSON file.
    Json { path: PathBuf },
}

/// Top-level adaptiq configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiqConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub blender: BlenderConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// Extra stop words for the complexity estimator.
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
    #[serde(default)]
    pub store: StoreConfig,
    /// Max learners replayed concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_parallelism() -> usize {
    4
}

impl Default for AdaptiqConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            blender: BlenderConfig::default(),
            analyzer: AnalyzerConfig::default(),
            extra_stop_words: Vec::new(),
            store: StoreConfig::default(),
            parallelism: default_parallelism(),
        }
    }
}

impl AdaptiqConfig {
    /// The engine portion of the configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tracker: self.tracker.clone(),
            blender: self.blender.clone(),
            analyzer: self.analyzer.clone(),
            extra_stop_words: self.extra_stop_words.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.engine_config().validate()?;
        if self.parallelism == 0 {
            anyhow::bail!("parallelism must be at least 1");
        }
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + len];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + len + 1..]);
        from = start + value.len();
    }
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Memory => StoreConfig::Memory,
        StoreConfig::Json { path } => StoreConfig::Json {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `adaptiq.toml` in the current directory
/// 2. `~/.config/adaptiq/config.toml`
///
/// `ADAPTIQ_STATE_PATH` overrides the store with a JSON file store.
pub fn load_config() -> Result<AdaptiqConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AdaptiqConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("adaptiq.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => AdaptiqConfig::default(),
    };

    if let Ok(state_path) = std::env::var("ADAPTIQ_STATE_PATH") {
        if !state_path.is_empty() {
            config.store = StoreConfig::Json {
                path: PathBuf::from(state_path),
            };
        }
    }

    config.store = resolve_store_config(&config.store);
    config.validate()?;
    Ok(config)
}

/// Parse a TOML config string without touching the environment overrides.
pub fn parse_config_str(content: &str) -> Result<AdaptiqConfig> {
    let config: AdaptiqConfig = toml::from_str(content)?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("adaptiq"))
}

/// Create a store instance from its configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn ProficiencyStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::Json { path } => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("failed to open state file: {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ADAPTIQ_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_ADAPTIQ_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_ADAPTIQ_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_ADAPTIQ_UNSET_VAR}/x"), "/x");
        assert_eq!(resolve_env_vars("no vars ${here"), "no vars ${here");
        std::env::remove_var("_ADAPTIQ_TEST_VAR");
    }

    #[test]
    fn expanded_value_is_not_expanded_again() {
        std::env::set_var("_ADAPTIQ_NESTED_VAR", "${_ADAPTIQ_NESTED_VAR}");
        assert_eq!(
            resolve_env_vars("${_ADAPTIQ_NESTED_VAR}"),
            "${_ADAPTIQ_NESTED_VAR}"
        );
        std::env::remove_var("_ADAPTIQ_NESTED_VAR");
    }

    #[test]
    fn default_config() {
        let config = AdaptiqConfig::default();
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(config.tracker.window_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
parallelism = 8
extra_stop_words = ["chapter", "exercise"]

[tracker]
window_size = 5
smoothing = 0.6

[blender]
floor = 0.2
ceiling = 0.8

[analyzer]
max_recommendations = 2

[store]
type = "json"
path = "state/levels.json"
"#;
        let config = parse_config_str(toml_str).unwrap();
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.tracker.window_size, 5);
        assert_eq!(config.tracker.default_level, 0.5);
        assert_eq!(config.blender.floor, 0.2);
        assert_eq!(config.analyzer.max_recommendations, 2);
        assert_eq!(config.analyzer.recommend_below, 0.7);
        assert_eq!(config.extra_stop_words, vec!["chapter", "exercise"]);
        assert_eq!(
            config.store,
            StoreConfig::Json {
                path: PathBuf::from("state/levels.json")
            }
        );

        let engine = config.engine_config();
        assert_eq!(engine.tracker.smoothing, 0.6);
        assert_eq!(engine.extra_stop_words.len(), 2);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/adaptiq.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adaptiq.toml");

        std::fs::write(&path, "parallelism = 2\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.parallelism, 2);

        std::fs::write(&path, "[blender]\nfloor = 0.9\nceiling = 0.1\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }

    #[test]
    fn create_stores_from_config() {
        let memory = create_store(&StoreConfig::Memory).unwrap();
        assert_eq!(memory.name(), "memory");

        let dir = tempfile::tempdir().unwrap();
        let json = create_store(&StoreConfig::Json {
            path: dir.path().join("levels.json"),
        })
        .unwrap();
        assert_eq!(json.name(), "json");
        json.put("alice", 0.4).unwrap();
        assert!(dir.path().join("levels.json").exists());
    }
}
