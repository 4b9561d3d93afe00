//! Data-driven game balance
//!
//! Variant flags and balance constants, loadable from JSON. Every field has a
//! default so tuning files only need to list what they override.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Value out of range: {field} = {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, TuningError>;

/// Which flavour of the game the simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Rectangular paddle against a static brick wall
    Bricks,
    /// Circular paddle against a marching invader fleet
    #[default]
    Invaders,
}

/// Formation controller balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationTuning {
    /// Frames between formation advances
    pub interval_frames: u32,
    /// Horizontal step per advance at game start
    pub initial_speed: f32,
    /// Step speed added on every direction flip
    pub speed_increment: f32,
    /// Vertical drop on every direction flip
    pub drop_step: f32,
    /// Distance from the side walls that triggers a flip
    pub margin: f32,
}

impl Default for FormationTuning {
    fn default() -> Self {
        Self {
            interval_frames: 30,
            initial_speed: 8.0,
            speed_increment: 2.0,
            drop_step: 16.0,
            margin: 20.0,
        }
    }
}

/// Enemy laser balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserTuning {
    /// A fire attempt happens once every this many frames
    pub interval_frames: u32,
    /// Probability that a fire attempt actually fires
    pub fire_chance: f64,
    /// Downward speed in pixels per frame
    pub speed: f32,
}

impl Default for LaserTuning {
    fn default() -> Self {
        Self {
            interval_frames: 90,
            fire_chance: 0.5,
            speed: 5.0,
        }
    }
}

/// Complete balance sheet for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub variant: Variant,
    /// Large/medium invaders split into two smaller ones
    pub splitting: bool,
    /// Invaders fire lasers at the paddle
    pub lasers: bool,
    pub starting_lives: u8,
    /// Ball speed cap applied after every paddle bounce
    pub ball_max_speed: f32,
    /// Ball velocity right after launch
    pub launch_velocity: Vec2,
    /// Horizontal velocity added at the edge of a rectangular paddle
    pub paddle_english: f32,
    pub formation: FormationTuning,
    pub laser: LaserTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::invaders()
    }
}

impl Tuning {
    /// Invader fleet with every mechanic enabled
    pub fn invaders() -> Self {
        Self {
            variant: Variant::Invaders,
            splitting: true,
            lasers: true,
            starting_lives: 3,
            ball_max_speed: 9.0,
            launch_velocity: Vec2::new(4.0, -5.0),
            paddle_english: 3.0,
            formation: FormationTuning::default(),
            laser: LaserTuning::default(),
        }
    }

    /// Classic brick wall
    pub fn bricks() -> Self {
        Self {
            variant: Variant::Bricks,
            splitting: false,
            lasers: false,
            ..Self::invaders()
        }
    }

    pub fn is_invaders(&self) -> bool {
        self.variant == Variant::Invaders
    }

    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, value: f32) -> Result<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { field, value: value as f64 })
            }
        }

        if self.starting_lives == 0 {
            return Err(TuningError::OutOfRange {
                field: "starting_lives",
                value: 0.0,
            });
        }
        positive("ball_max_speed", self.ball_max_speed)?;
        // Launch must head upward, away from the paddle
        positive("launch_velocity.y", -self.launch_velocity.y)?;
        if !self.paddle_english.is_finite() || self.paddle_english < 0.0 {
            return Err(TuningError::OutOfRange {
                field: "paddle_english",
                value: self.paddle_english as f64,
            });
        }

        if self.formation.interval_frames == 0 {
            return Err(TuningError::OutOfRange {
                field: "formation.interval_frames",
                value: 0.0,
            });
        }
        positive("formation.initial_speed", self.formation.initial_speed)?;
        positive("formation.speed_increment", self.formation.speed_increment)?;
        positive("formation.drop_step", self.formation.drop_step)?;
        if self.formation.margin < 0.0 {
            return Err(TuningError::OutOfRange {
                field: "formation.margin",
                value: self.formation.margin as f64,
            });
        }

        if self.laser.interval_frames == 0 {
            return Err(TuningError::OutOfRange {
                field: "laser.interval_frames",
                value: 0.0,
            });
        }
        if !(0.0..=1.0).contains(&self.laser.fire_chance) {
            return Err(TuningError::OutOfRange {
                field: "laser.fire_chance",
                value: self.laser.fire_chance,
            });
        }
        positive("laser.speed", self.laser.speed)?;

        Ok(())
    }
}
