//! Visual themes.
//!
//! A theme is an opaque bundle of palette handles consumed only by the
//! renderer; the simulation never looks inside one. Built-in presets can
//! be cycled from the ready screen, and a custom theme can be loaded from
//! a TOML file with the same shape.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Blend `a` toward `b`; `t_256` is 0..=256.
    pub const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    pub const fn dimmed(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub sky_top: Rgb,
    pub sky_bottom: Rgb,
    pub pipe_body: Rgb,
    pub pipe_lip: Rgb,
    pub bird_body: Rgb,
    pub bird_accent: Rgb,
    pub bird_beak: Rgb,
    pub ground: Rgb,
    pub ground_dark: Rgb,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            name: "classic".into(),
            sky_top: Rgb(70, 180, 200),
            sky_bottom: Rgb(190, 232, 245),
            pipe_body: Rgb(100, 170, 40),
            pipe_lip: Rgb(60, 100, 20),
            bird_body: Rgb(245, 200, 66),
            bird_accent: Rgb(215, 165, 35),
            bird_beak: Rgb(225, 75, 35),
            ground: Rgb(210, 185, 110),
            ground_dark: Rgb(185, 160, 90),
        }
    }

    pub fn sunset() -> Self {
        Self {
            name: "sunset".into(),
            sky_top: Rgb(250, 130, 80),
            sky_bottom: Rgb(255, 210, 140),
            pipe_body: Rgb(120, 70, 130),
            pipe_lip: Rgb(80, 40, 90),
            bird_body: Rgb(240, 240, 235),
            bird_accent: Rgb(190, 190, 185),
            bird_beak: Rgb(250, 160, 40),
            ground: Rgb(150, 100, 80),
            ground_dark: Rgb(120, 80, 60),
        }
    }

    pub fn midnight() -> Self {
        Self {
            name: "midnight".into(),
            sky_top: Rgb(15, 20, 60),
            sky_bottom: Rgb(60, 70, 130),
            pipe_body: Rgb(70, 200, 180),
            pipe_lip: Rgb(40, 140, 125),
            bird_body: Rgb(250, 230, 120),
            bird_accent: Rgb(210, 185, 80),
            bird_beak: Rgb(245, 120, 60),
            ground: Rgb(50, 55, 90),
            ground_dark: Rgb(35, 40, 70),
        }
    }

    pub fn meadow() -> Self {
        Self {
            name: "meadow".into(),
            sky_top: Rgb(140, 210, 235),
            sky_bottom: Rgb(225, 245, 250),
            pipe_body: Rgb(170, 120, 70),
            pipe_lip: Rgb(120, 85, 50),
            bird_body: Rgb(220, 90, 100),
            bird_accent: Rgb(175, 60, 70),
            bird_beak: Rgb(250, 200, 70),
            ground: Rgb(110, 200, 70),
            ground_dark: Rgb(84, 168, 55),
        }
    }

    pub fn presets() -> Vec<Theme> {
        vec![
            Self::classic(),
            Self::sunset(),
            Self::midnight(),
            Self::meadow(),
        ]
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading theme {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing theme {}", path.display()))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
