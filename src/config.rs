//! Scene configuration.
//!
//! A [`SceneConfig`] describes everything about a scene that is fixed for its
//! lifetime: canvas geometry, where trees stand, pool caps, the rng seed and
//! per-kind physics overrides. It serializes to JSON and every field has a
//! default, so a config file only needs the values it changes.

use crate::body::BodyKind;
use crate::context::{Bounds, Rect};
use crate::error::ConfigError;
use crate::profile::ProfileTable;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Hard caps for every body pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolCaps {
    pub leaves: usize,
    pub pickups: usize,
    pub rain: usize,
    pub splashes: usize,
    pub clouds: usize,
    pub smoke: usize,
    pub fragments: usize,
    pub sparks: usize,
}

impl Default for PoolCaps {
    fn default() -> Self {
        Self {
            leaves: 600,
            pickups: 80,
            rain: 1500,
            splashes: 400,
            clouds: 14,
            smoke: 300,
            fragments: 120,
            sparks: 200,
        }
    }
}

impl PoolCaps {
    fn named(&self) -> [(&'static str, usize); 8] {
        [
            ("leaves", self.leaves),
            ("pickups", self.pickups),
            ("rain", self.rain),
            ("splashes", self.splashes),
            ("clouds", self.clouds),
            ("smoke", self.smoke),
            ("fragments", self.fragments),
            ("sparks", self.sparks),
        ]
    }
}

/// Complete scene configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub bounds: Bounds,
    /// Band leaves and fruit fall from.
    pub canopy: Rect,
    /// Band clouds drift in.
    pub sky: Rect,
    /// One rectangle per tree, trunk to crown.
    pub trees: Vec<Rect>,
    /// Chimney mouths that smoke once the city arrives.
    pub chimneys: Vec<Vec2>,
    pub caps: PoolCaps,
    pub seed: u64,
    /// Target frame time for adaptive quality.
    pub frame_budget_ms: f32,
    /// Progress at which the forest gives way to the city.
    pub city_threshold: f32,
    /// Per-kind physics overrides.
    pub profiles: ProfileTable,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let bounds = Bounds::default();
        let trees = (0..5)
            .map(|i| {
                let x = 80.0 + i as f32 * 240.0;
                Rect::new(Vec2::new(x, 110.0), Vec2::new(x + 170.0, bounds.ground_y))
            })
            .collect();
        Self {
            bounds,
            canopy: Rect::new(Vec2::new(0.0, 60.0), Vec2::new(bounds.width, 300.0)),
            sky: Rect::new(Vec2::new(0.0, 10.0), Vec2::new(bounds.width, 150.0)),
            trees,
            chimneys: vec![Vec2::new(980.0, 380.0), Vec2::new(1140.0, 340.0)],
            caps: PoolCaps::default(),
            seed: 0x5EED,
            frame_budget_ms: 1000.0 / 60.0,
            city_threshold: 0.85,
            profiles: ProfileTable::default(),
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_trees(mut self, trees: Vec<Rect>) -> Self {
        self.trees = trees;
        self
    }

    pub fn with_caps(mut self, caps: PoolCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn with_profile(mut self, kind: BodyKind, profile: crate::profile::PhysicalProfile) -> Self {
        self.profiles.set(kind, profile);
        self
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot describe a scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.bounds;
        if !(b.width > 0.0 && b.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be positive, got {}x{}",
                b.width, b.height
            )));
        }
        if !(b.ground_y > 0.0 && b.ground_y <= b.height) {
            return Err(ConfigError::Invalid(format!(
                "ground_y {} is outside the canvas (height {})",
                b.ground_y, b.height
            )));
        }
        if let Some((name, _)) = self.caps.named().iter().find(|(_, cap)| *cap == 0) {
            return Err(ConfigError::Invalid(format!("pool cap `{}` must be non-zero", name)));
        }
        if !(self.frame_budget_ms > 0.0) {
            return Err(ConfigError::Invalid("frame_budget_ms must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.city_threshold) {
            return Err(ConfigError::Invalid(format!(
                "city_threshold {} is outside [0, 1]",
                self.city_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::PhysicalProfile;

    #[test]
    fn test_default_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SceneConfig::from_json(r#"{ "seed": 7, "caps": { "rain": 50 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.caps.rain, 50);
        assert_eq!(config.caps.leaves, PoolCaps::default().leaves);
        assert_eq!(config.trees.len(), 5);
    }

    #[test]
    fn test_zero_cap_rejected() {
        let err = SceneConfig::from_json(r#"{ "caps": { "smoke": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("smoke")));
    }

    #[test]
    fn test_ground_outside_canvas_rejected() {
        let config = SceneConfig::new().with_bounds(Bounds::new(100.0, 100.0, 150.0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_json_is_json_error() {
        assert!(matches!(SceneConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let profile = PhysicalProfile {
            restitution: 0.6,
            ..PhysicalProfile::builtin(BodyKind::Apple)
        };
        let config = SceneConfig::new().with_seed(99).with_profile(BodyKind::Apple, profile);
        config.save(&path).unwrap();

        let loaded = SceneConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.profiles.get(BodyKind::Apple).restitution, 0.6);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
