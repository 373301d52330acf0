//! adaptiq-core: Proficiency tracking, difficulty blending, and analytics.
//!
//! This crate defines the score data model, the proficiency store seam, and
//! the four analytic components (tracker, complexity estimator, blender,
//! performance analyzer) that the rest of adaptiq builds on.

pub mod analyzer;
pub mod blend;
pub mod complexity;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod proficiency;
pub mod report;
pub mod traits;

pub use analyzer::{PerformanceAnalyzer, Summary};
pub use blend::DifficultyBlender;
pub use complexity::{Complexity, ComplexityEstimator};
pub use engine::AdaptiveEngine;
pub use error::{EngineError, FallbackReason, StoreError};
pub use model::ScoreRecord;
pub use proficiency::ProficiencyTracker;
pub use traits::ProficiencyStore;
