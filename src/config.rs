//! Data-driven tuning: stage geometry, bar and ball physics, power-ups, levels
//!
//! The shipped document lives in `assets/config.json` and is embedded at
//! compile time. Every section is `#[serde(default)]`, so a partial document
//! only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{GRID_COLS, GRID_ROWS};
use crate::sim::BrickKind;

const EMBEDDED_CONFIG: &str = include_str!("../assets/config.json");

/// Errors raised while loading or checking a config document
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not valid JSON for [`GameConfig`]
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but cannot be played
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub normal_width: u32,
    pub normal_height: u32,
    pub debug_width: u32,
    pub debug_height: u32,
    /// Target frame time in milliseconds
    pub sleep_ms: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            normal_width: 800,
            normal_height: 800,
            debug_width: 1200,
            debug_height: 800,
            sleep_ms: 16.0,
        }
    }
}

/// Bar (paddle) tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub mass: f32,
    pub friction: f32,
    pub elasticity: f32,
    pub moment: f32,
    pub infinity: bool,
    /// Acceleration while a direction is held (px/s²)
    pub speed: f32,
    /// Top speed (px/s)
    pub max_speed: f32,
    /// Fraction of velocity kept per second once released
    pub damping: f32,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            x: 400.0,
            y: 700.0,
            width: 100.0,
            height: 20.0,
            mass: 10.0,
            friction: 0.3,
            elasticity: 1.0,
            moment: 1.0,
            infinity: true,
            speed: 4000.0,
            max_speed: 620.0,
            damping: 0.0005,
        }
    }
}

impl BarConfig {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Ball tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub mass: f32,
    pub friction: f32,
    pub elasticity: f32,
    pub moment: f32,
    pub infinity: bool,
    /// Launch and cruise speed (px/s)
    pub speed: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            x: 400.0,
            y: 681.0,
            radius: 8.0,
            mass: 1.0,
            friction: 0.0,
            elasticity: 1.0,
            moment: 1.0,
            infinity: true,
            speed: 420.0,
        }
    }
}

impl BallConfig {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// An axis-aligned box given by centre and full size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxConfig {
    pub center: Vec2,
    pub size: Vec2,
}

impl BoxConfig {
    pub const fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            center: Vec2::new(cx, cy),
            size: Vec2::new(w, h),
        }
    }

    /// Top-left corner
    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    /// Bottom-right corner
    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }
}

/// The four stage boxes; `bottom` is the out-of-bounds limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallsConfig {
    pub top: BoxConfig,
    pub bottom: BoxConfig,
    pub left: BoxConfig,
    pub right: BoxConfig,
    pub elasticity: f32,
    pub friction: f32,
}

impl Default for WallsConfig {
    fn default() -> Self {
        Self {
            top: BoxConfig::new(400.0, 90.0, 760.0, 20.0),
            bottom: BoxConfig::new(400.0, 770.0, 760.0, 20.0),
            left: BoxConfig::new(30.0, 430.0, 20.0, 700.0),
            right: BoxConfig::new(770.0, 430.0, 20.0, 700.0),
            elasticity: 1.0,
            friction: 0.0,
        }
    }
}

/// Brick grid placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Centre of the first cell
    pub origin: Vec2,
    /// Distance between neighbouring cell centres
    pub spacing: Vec2,
    pub brick_size: Vec2,
    pub elasticity: f32,
    pub friction: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::new(170.0, 200.0),
            spacing: Vec2::new(50.0, 30.0),
            brick_size: Vec2::new(46.0, 26.0),
            elasticity: 1.0,
            friction: 0.0,
        }
    }
}

/// Falling capsules dropped by destroyed bricks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    /// Probability that a destroyed brick drops a capsule
    pub drop_chance: f64,
    /// Capsule fall speed (px/s)
    pub fall_speed: f32,
    pub size: Vec2,
    /// How long timed effects last
    pub duration_secs: f32,
    /// Bar width multiplier while widened
    pub widen_factor: f32,
    /// Ball speed multiplier while slowed
    pub slow_factor: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            drop_chance: 0.15,
            fall_speed: 150.0,
            size: Vec2::new(30.0, 14.0),
            duration_secs: 10.0,
            widen_factor: 1.5,
            slow_factor: 0.7,
        }
    }
}

/// One level layout, row-major, [`GRID_COLS`] cells per row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub cells: Vec<u8>,
}

impl LevelConfig {
    /// Cells holding a brick
    pub fn brick_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }
}

/// Complete tuning document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    /// Levels to play before victory
    pub total_levels: u16,
    pub bar: BarConfig,
    pub ball: BallConfig,
    pub walls: WallsConfig,
    pub grid: GridConfig,
    pub powerups: PowerUpConfig,
    pub levels: Vec<LevelConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            total_levels: crate::consts::NUM_LEVELS,
            bar: BarConfig::default(),
            ball: BallConfig::default(),
            walls: WallsConfig::default(),
            grid: GridConfig::default(),
            powerups: PowerUpConfig::default(),
            levels: Vec::new(),
        }
    }
}

impl GameConfig {
    /// The document compiled into the binary
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(EMBEDDED_CONFIG)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Load `path`, falling back to the embedded document on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load_from_file(path.as_ref()) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::warn!("{e}; using embedded config");
                Self::embedded()
            }
        }
    }

    /// Level definition, 1-based
    pub fn level(&self, n: u16) -> Option<&LevelConfig> {
        let idx = usize::from(n).checked_sub(1)?;
        self.levels.get(idx)
    }

    /// Hard errors that make the document unplayable
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Invalid("no levels defined".into()));
        }
        if self.total_levels == 0 || usize::from(self.total_levels) > self.levels.len() {
            return Err(ConfigError::Invalid(format!(
                "total_levels {} out of range 1..={}",
                self.total_levels,
                self.levels.len()
            )));
        }
        let max_cells = GRID_COLS * GRID_ROWS;
        for (i, level) in self.levels.iter().enumerate() {
            if level.cells.len() > max_cells {
                return Err(ConfigError::Invalid(format!(
                    "level {} has {} cells (max {max_cells})",
                    i + 1,
                    level.cells.len()
                )));
            }
            if let Some(bad) = level.cells.iter().find(|&&c| c > BrickKind::MAX) {
                return Err(ConfigError::Invalid(format!(
                    "level {} has unknown brick kind {bad}",
                    i + 1
                )));
            }
        }
        Ok(())
    }

    /// Non-fatal warnings for suspicious values
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.ball.speed <= 0.0 {
            w.push(format!("ball.speed {} must be > 0", self.ball.speed));
        }
        if self.bar.speed <= 0.0 || self.bar.max_speed <= 0.0 {
            w.push(format!(
                "bar speed {} / max_speed {} must be > 0; bar cannot move",
                self.bar.speed, self.bar.max_speed
            ));
        }
        if !(0.0..=1.0).contains(&self.bar.damping) {
            w.push(format!("bar.damping {} outside [0,1]", self.bar.damping));
        }
        for (label, e) in [
            ("bar", self.bar.elasticity),
            ("ball", self.ball.elasticity),
            ("walls", self.walls.elasticity),
            ("grid", self.grid.elasticity),
        ] {
            if e > 1.0 {
                w.push(format!("{label}.elasticity {e} > 1 adds energy on bounce"));
            }
        }
        if !(0.0..=1.0).contains(&self.powerups.drop_chance) {
            w.push(format!(
                "powerups.drop_chance {} outside [0,1]",
                self.powerups.drop_chance
            ));
        }
        if self.powerups.fall_speed <= 0.0 {
            w.push("powerups.fall_speed <= 0; capsules never reach the bar".into());
        }
        if self.powerups.duration_secs <= 0.0 {
            w.push(format!(
                "powerups.duration_secs {} <= 0; timed effects last a single tick",
                self.powerups.duration_secs
            ));
        }
        let inner_width = self.walls.right.min().x - self.walls.left.max().x;
        let inner_height = self.walls.bottom.min().y - self.walls.top.max().y;
        if inner_width < self.bar.width * 2.0 || inner_height < self.ball.radius * 8.0 {
            w.push(format!(
                "stage interior {inner_width}x{inner_height} too small for bar and ball"
            ));
        }
        if self.bar.y >= self.walls.bottom.min().y {
            w.push("bar sits inside or below the bottom limit".into());
        }
        if (self.window.normal_width as f32) < self.walls.right.max().x {
            w.push("window narrower than the stage".into());
        }
        for (i, level) in self.levels.iter().enumerate() {
            if level.brick_count() == 0 {
                w.push(format!("level {} has no bricks and clears instantly", i + 1));
            }
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_is_playable() {
        let config = GameConfig::embedded().unwrap();
        assert_eq!(config.total_levels, 3);
        assert_eq!(config.levels.len(), 3);
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        for level in &config.levels {
            assert_eq!(level.cells.len(), GRID_COLS * GRID_ROWS);
        }
        assert!(config.level(0).is_none());
        assert!(config.level(1).is_some());
        assert!(config.level(4).is_none());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let json = r#"{
            "total_levels": 1,
            "ball": { "speed": 300.0 },
            "levels": [ { "cells": [1, 0, 2] } ]
        }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!(config.ball.speed, 300.0);
        assert_eq!(config.ball.radius, BallConfig::default().radius);
        assert_eq!(config.walls, WallsConfig::default());
        assert_eq!(config.level(1).unwrap().brick_count(), 2);
    }

    #[test]
    fn test_check_rejects_bad_levels() {
        let no_levels = r#"{ "levels": [] }"#;
        assert!(matches!(
            GameConfig::from_json(no_levels),
            Err(ConfigError::Invalid(_))
        ));

        let too_many = r#"{ "total_levels": 2, "levels": [ { "cells": [1] } ] }"#;
        assert!(matches!(
            GameConfig::from_json(too_many),
            Err(ConfigError::Invalid(_))
        ));

        let bad_kind = r#"{ "total_levels": 1, "levels": [ { "cells": [1, 7] } ] }"#;
        assert!(matches!(
            GameConfig::from_json(bad_kind),
            Err(ConfigError::Invalid(_))
        ));

        let oversized = format!(
            r#"{{ "total_levels": 1, "levels": [ {{ "cells": {:?} }} ] }}"#,
            vec![1u8; GRID_COLS * GRID_ROWS + 1]
        );
        assert!(GameConfig::from_json(&oversized).is_err());
    }

    #[test]
    fn test_strongest_brick_kind_is_accepted() {
        let doc = |kind: u8| {
            format!(r#"{{ "total_levels": 1, "levels": [ {{ "cells": [{kind}] }} ] }}"#)
        };
        assert!(GameConfig::from_json(&doc(BrickKind::MAX)).is_ok());
        assert!(GameConfig::from_json(&doc(BrickKind::MAX + 1)).is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let err = GameConfig::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.json"));

        let config = GameConfig::load_or_default("/definitely/not/here.json").unwrap();
        assert_eq!(config, GameConfig::embedded().unwrap());
    }

    #[test]
    fn test_validate_warnings() {
        let mut config = GameConfig::embedded().unwrap();
        config.ball.speed = 0.0;
        config.ball.elasticity = 1.5;
        config.powerups.drop_chance = 2.0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert!(warnings.iter().any(|w| w.contains("ball.speed")));
        assert!(warnings.iter().any(|w| w.contains("drop_chance")));
    }

    #[test]
    fn test_validate_flags_non_positive_effect_duration() {
        let mut config = GameConfig::embedded().unwrap();
        assert!(config.validate().is_empty());
        config.powerups.duration_secs = 0.0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains("duration_secs"));
    }
}
