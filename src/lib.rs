//! Brick Invaders - brick-breaker meets a descending invader fleet
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (physics, collisions, formation, game state)
//! - `session`: Host-side driver (input latching, frame pacing, event publication)
//! - `tuning`: Data-driven game balance and variant flags

pub mod session;
pub mod sim;
pub mod tuning;

pub use session::{FrameSink, LogSink, Session};
pub use tuning::{Tuning, TuningError, Variant};

/// Game configuration constants
///
/// All distances are in playfield pixels (origin top-left, y grows downward),
/// all rates are per simulation frame.
pub mod consts {
    /// Fixed simulation timestep (one frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Gap between an attached ball and the paddle surface
    pub const BALL_ATTACH_GAP: f32 = 2.0;
    /// Smallest upward speed a paddle bounce may leave the ball with
    pub const BALL_MIN_UPWARD_SPEED: f32 = 1.0;

    /// Paddle defaults (rectangular paddle in brick mode)
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Circular paddle diameter (invader mode)
    pub const ROUND_PADDLE_WIDTH: f32 = 60.0;
    /// Paddle centre line at game start
    pub const PADDLE_Y: f32 = 560.0;

    /// Brick wall layout
    pub const BRICK_ROWS: u32 = 5;
    pub const BRICK_COLS: u32 = 10;
    pub const BRICK_WIDTH: f32 = 70.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_PADDING: f32 = 8.0;
    pub const BRICK_TOP: f32 = 50.0;
    pub const BRICK_LEFT: f32 = 14.0;

    /// Invader fleet layout
    pub const INVADER_ROWS: u32 = 4;
    pub const INVADER_COLS: u32 = 8;
    pub const INVADER_H_SPACING: f32 = 70.0;
    pub const INVADER_V_SPACING: f32 = 50.0;
    pub const INVADER_TOP: f32 = 60.0;
    pub const INVADER_LEFT: f32 = 120.0;

    /// Points per row step: row r is worth (r + 1) * ROW_POINTS
    pub const ROW_POINTS: u64 = 10;

    /// Split-child spawn animation
    pub const SPAWN_INITIAL_SCALE: f32 = 0.05;
    pub const SPAWN_ROTATION_STEP: f32 = 0.2;
    pub const SPAWN_SCALE_STEP: f32 = 0.05;
    pub const SPAWN_EASE: f32 = 0.15;
    pub const SPAWN_EPSILON: f32 = 0.5;
    pub const SPAWN_SETTLED_SCALE: f32 = 0.95;
    /// Horizontal gap between the two children of a split
    pub const SPLIT_GAP: f32 = 4.0;

    /// Debris
    pub const DEBRIS_MIN_PIECES: usize = 8;
    pub const DEBRIS_MAX_PIECES: usize = 12;
    pub const DEBRIS_GRAVITY: f32 = 0.25;
    pub const DEBRIS_LIFE_DECAY: f32 = 0.02;
    pub const DEBRIS_BOUNCE_DAMPING: f32 = 0.5;
    pub const DEBRIS_FRICTION: f32 = 0.8;
    pub const DEBRIS_WALL_DAMPING: f32 = 0.7;
    pub const MAX_DEBRIS: usize = 256;

    /// Explosion burst
    pub const EXPLOSION_PARTICLES: usize = 16;
    pub const EXPLOSION_LIFE_DECAY: f32 = 0.04;
    pub const EXPLOSION_DRAG: f32 = 0.96;
    pub const MAX_PARTICLES: usize = 256;

    /// Colour tag for effects spawned at the paddle or ball
    pub const PLAYER_COLOR: u32 = 100;

    /// Paddle warp-in easing per frame
    pub const WARP_IN_STEP: f32 = 0.05;

    /// Laser projectile size
    pub const LASER_WIDTH: f32 = 4.0;
    pub const LASER_HEIGHT: f32 = 14.0;
}
