//! A themeable Flappy Bird clone for the terminal.
//!
//! The crate is organized around a pure, infallible simulation core
//! ([`sim::Simulation`]) that owns all round state. Everything else is a
//! thin collaborator: [`config`] supplies the tuning numbers, [`theme`]
//! supplies opaque palettes for the renderer, [`render`] draws the scene
//! into a half-block pixel buffer, [`audio`] plays synthesized cues, and
//! [`history`] persists round scores.

pub mod audio;
pub mod config;
pub mod history;
pub mod render;
pub mod sim;
pub mod theme;

pub use config::{DifficultyConfig, GameConfig};
pub use sim::{Bird, Pipe, RoundEvent, RoundState, Simulation};
pub use theme::{Rgb, Theme};
