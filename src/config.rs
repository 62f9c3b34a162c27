//! Tuning parameters for the simulation.
//!
//! Every number the simulation consumes lives here: display geometry,
//! physics constants, pipe layout, and the difficulty curve. Defaults are
//! the classic tuning; any subset can be overridden from a TOML file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Difficulty scaling: every `score_interval` points the level goes up by
/// one, pipes speed up by `speed_step` and the gap shrinks by `gap_step`,
/// saturating at `max_speed` / `min_gap`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub score_interval: u32,
    pub speed_step: f64,
    pub gap_step: f64,
    pub max_speed: f64,
    pub min_gap: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            score_interval: 5,
            speed_step: 0.25,
            gap_step: 10.0,
            max_speed: 4.5,
            min_gap: 120.0,
        }
    }
}

/// All simulation tuning, in virtual pixels and pixels-per-frame.
///
/// The virtual playfield is 400x600 regardless of terminal size; the
/// renderer maps it onto whatever grid it has.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_w: f64,
    pub screen_h: f64,
    pub bird_size: f64,
    /// The bird's fixed horizontal position (left edge of its sprite).
    pub bird_x: f64,
    pub gravity: f64,
    /// Flap impulse; negative is upward. Overrides velocity, never adds.
    pub jump_velocity: f64,
    /// Terminal fall speed. Ascent is unclamped.
    pub max_velocity: f64,
    pub pipe_width: f64,
    pub base_gap: f64,
    pub pipe_spacing: f64,
    pub base_speed: f64,
    pub difficulty: DifficultyConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_w: 400.0,
            screen_h: 600.0,
            bird_size: 32.0,
            bird_x: 80.0,
            gravity: 0.4,
            jump_velocity: -7.0,
            max_velocity: 10.0,
            pipe_width: 60.0,
            base_gap: 180.0,
            pipe_spacing: 250.0,
            base_speed: 2.5,
            difficulty: DifficultyConfig::default(),
        }
    }
}

impl GameConfig {
    /// Read a config from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.screen_w > 0.0 && self.screen_h > 0.0,
            "screen dimensions must be positive"
        );
        ensure!(
            self.bird_size > 0.0 && self.pipe_width > 0.0,
            "sprite sizes must be positive"
        );
        ensure!(self.gravity > 0.0, "gravity must be positive");
        ensure!(
            self.jump_velocity < 0.0,
            "jump impulse must be negative (upward)"
        );
        ensure!(self.max_velocity > 0.0, "max velocity must be positive");
        ensure!(self.base_speed > 0.0, "pipe speed must be positive");
        ensure!(self.pipe_spacing > self.pipe_width, "pipes must not overlap");
        ensure!(self.base_gap > self.bird_size, "gap must fit the bird");
        ensure!(
            self.difficulty.score_interval > 0,
            "difficulty interval must be positive"
        );
        ensure!(
            self.difficulty.min_gap <= self.base_gap,
            "min gap cannot exceed base gap"
        );
        ensure!(
            self.difficulty.min_gap > self.bird_size,
            "min gap must fit the bird"
        );
        ensure!(
            self.difficulty.max_speed >= self.base_speed,
            "max speed cannot undercut base speed"
        );
        Ok(())
    }

    pub fn level_for_score(&self, score: u32) -> u32 {
        score / self.difficulty.score_interval
    }

    /// Pipe speed at a difficulty level: linear ramp, saturating at
    /// `max_speed`. Monotonically non-decreasing in the level.
    pub fn speed_at(&self, level: u32) -> f64 {
        (self.base_speed + level as f64 * self.difficulty.speed_step).min(self.difficulty.max_speed)
    }

    /// Gap height at a difficulty level: linear shrink, saturating at
    /// `min_gap`. Monotonically non-increasing in the level.
    pub fn gap_at(&self, level: u32) -> f64 {
        (self.base_gap - level as f64 * self.difficulty.gap_step).max(self.difficulty.min_gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_tuning() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.screen_w, 400.0);
        assert_eq!(cfg.screen_h, 600.0);
        assert_eq!(cfg.bird_size, 32.0);
        assert_eq!(cfg.bird_x, 80.0);
        assert_eq!(cfg.gravity, 0.4);
        assert_eq!(cfg.jump_velocity, -7.0);
        assert_eq!(cfg.max_velocity, 10.0);
        assert_eq!(cfg.pipe_width, 60.0);
        assert_eq!(cfg.base_gap, 180.0);
        assert_eq!(cfg.pipe_spacing, 250.0);
        assert_eq!(cfg.base_speed, 2.5);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_toml_overrides_keep_defaults() {
        let cfg: GameConfig = toml::from_str(
            r#"
            gravity = 0.5

            [difficulty]
            score_interval = 10
            "#,
        )
        .unwrap();
        assert_eq!(cfg.gravity, 0.5);
        assert_eq!(cfg.difficulty.score_interval, 10);
        // Untouched keys fall back to defaults.
        assert_eq!(cfg.jump_velocity, -7.0);
        assert_eq!(cfg.difficulty.min_gap, 120.0);
    }

    #[test]
    fn speed_ramps_and_saturates() {
        let cfg = GameConfig::default();
        let mut prev = 0.0;
        for level in 0..100 {
            let s = cfg.speed_at(level);
            assert!(s >= prev);
            assert!(s >= cfg.base_speed && s <= cfg.difficulty.max_speed);
            prev = s;
        }
        assert_eq!(cfg.speed_at(0), 2.5);
        assert_eq!(cfg.speed_at(8), 4.5);
        assert_eq!(cfg.speed_at(100), 4.5);
    }

    #[test]
    fn gap_shrinks_and_saturates() {
        let cfg = GameConfig::default();
        let mut prev = f64::INFINITY;
        for level in 0..100 {
            let g = cfg.gap_at(level);
            assert!(g <= prev);
            assert!(g >= cfg.difficulty.min_gap && g <= cfg.base_gap);
            prev = g;
        }
        assert_eq!(cfg.gap_at(0), 180.0);
        assert_eq!(cfg.gap_at(6), 120.0);
        assert_eq!(cfg.gap_at(100), 120.0);
    }

    #[test]
    fn level_steps_on_interval() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.level_for_score(0), 0);
        assert_eq!(cfg.level_for_score(4), 0);
        assert_eq!(cfg.level_for_score(5), 1);
        assert_eq!(cfg.level_for_score(23), 4);
    }

    #[test]
    fn validate_rejects_bad_configs() {
        let mut cfg = GameConfig::default();
        cfg.difficulty.min_gap = 500.0;
        assert!(cfg.validate().is_err());

        let mut cfg = GameConfig::default();
        cfg.jump_velocity = 2.0;
        assert!(cfg.validate().is_err());

        let mut cfg = GameConfig::default();
        cfg.difficulty.max_speed = 1.0;
        assert!(cfg.validate().is_err());
    }
}
