//! Difficulty blending.

use serde::{Deserialize, Serialize};

/// Bounds for blended difficulty. Neither bound may reach 0 or 1, leaving
/// room for the "basic" and "challenging" ends of question generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlenderConfig {
    #[serde(default = "default_floor")]
    pub floor: f64,
    #[serde(default = "default_ceiling")]
    pub ceiling: f64,
}

fn default_floor() -> f64 {
    0.1
}
fn default_ceiling() -> f64 {
    0.9
}

impl Default for BlenderConfig {
    fn default() -> Self {
        Self {
            floor: default_floor(),
            ceiling: default_ceiling(),
        }
    }
}

impl BlenderConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            0.0 < self.floor && self.floor <= self.ceiling && self.ceiling < 1.0,
            "blender bounds must satisfy 0 < floor <= ceiling < 1 (got {} and {})",
            self.floor,
            self.ceiling
        );
        Ok(())
    }
}

/// Combines learner proficiency and content complexity into a target difficulty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifficultyBlender {
    config: BlenderConfig,
}

impl DifficultyBlender {
    pub fn new(config: BlenderConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// `(proficiency + complexity) / 2`, clamped to `[floor, ceiling]`.
    pub fn blend(&self, proficiency: f64, complexity: f64) -> f64 {
        let target = (proficiency + complexity) / 2.0;
        let target = if target.is_finite() { target } else { 0.5 };
        target.clamp(self.config.floor, self.config.ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values() {
        let b = DifficultyBlender::default();
        assert!((b.blend(0.0, 0.0) - 0.1).abs() < f64::EPSILON);
        assert!((b.blend(1.0, 1.0) - 0.9).abs() < f64::EPSILON);
        assert!((b.blend(0.5, 0.5) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn output_always_bounded() {
        let b = DifficultyBlender::default();
        for p in 0..=20 {
            for c in 0..=20 {
                let d = b.blend(p as f64 / 20.0, c as f64 / 20.0);
                assert!((0.1..=0.9).contains(&d), "blend({p}, {c}) = {d}");
            }
        }
    }

    #[test]
    fn unbounded_complexity_is_clamped() {
        let b = DifficultyBlender::default();
        assert_eq!(b.blend(0.9, 3.0), 0.9);
        assert_eq!(b.blend(f64::NAN, 0.2), 0.5);
    }

    #[test]
    fn config_validation() {
        assert!(BlenderConfig::default().validate().is_ok());
        assert!(BlenderConfig {
            floor: 0.0,
            ceiling: 0.9
        }
        .validate()
        .is_err());
        assert!(BlenderConfig {
            floor: 0.6,
            ceiling: 0.4
        }
        .validate()
        .is_err());
        assert!(BlenderConfig {
            floor: f64::NAN,
            ceiling: 0.9
        }
        .validate()
        .is_err());
    }

    #[test]
    fn inverted_bounds_are_rejected_at_construction() {
        let err = DifficultyBlender::new(BlenderConfig {
            floor: 0.6,
            ceiling: 0.4,
        })
        .unwrap_err();
        assert!(err.to_string().contains("floor <= ceiling"));

        let b = DifficultyBlender::new(BlenderConfig {
            floor: 0.4,
            ceiling: 0.4,
        })
        .unwrap();
        assert_eq!(b.blend(0.0, 1.0), 0.4);
    }
}
