//! Frame-driven simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One step per frame, run to completion
//! - Injected RNG only (cosmetics and laser fire)
//! - Stable iteration order (layout order, first match wins)
//! - No rendering or platform dependencies

pub mod collision;
pub mod events;
pub mod formation;
pub mod state;
pub mod tick;

pub use collision::{Rect, reflect_velocity};
pub use events::{GameEvent, GameOverCause};
pub use formation::{Direction, Formation, FormationStep};
pub use state::{
    Ball, BallState, Debris, GamePhase, GameState, InvaderTier, Laser, Paddle, PaddleShape,
    Particle, SpawnAnim, Target, TargetKind, WarpIn,
};
pub use tick::{TickInput, generate_layout, tick};
