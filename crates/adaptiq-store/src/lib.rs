//! adaptiq-store: Proficiency store backends and configuration.
//!
//! Implements the `ProficiencyStore` trait for an in-process map and a JSON
//! file, and loads `adaptiq.toml` into engine and store settings.

pub mod config;
pub mod json_file;
pub mod memory;

pub use config::{
    create_store, load_config, load_config_from, parse_config_str, AdaptiqConfig, StoreConfig,
};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
