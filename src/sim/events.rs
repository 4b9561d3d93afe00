//! Discrete gameplay events
//!
//! Raised by the simulation step and published to audio/UI collaborators
//! after the step has settled.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::formation::Direction;
use super::state::InvaderTier;

/// Why a run ended in defeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    LivesExhausted,
    /// An invader reached the bottom of the playfield
    InvasionReachedBottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball bounced off a side or the top wall
    WallHit,
    /// Ball bounced off the paddle
    PaddleHit,
    /// Launch input detached the ball
    BallLaunched,
    TargetDestroyed {
        row: u32,
        /// None for bricks
        tier: Option<InvaderTier>,
        pos: Vec2,
        points: u64,
    },
    FormationAdvanced {
        direction: Direction,
        speed: f32,
        dropped: bool,
    },
    LaserFired {
        pos: Vec2,
    },
    LifeLost {
        lives: u8,
    },
    GameOver {
        score: u64,
        cause: GameOverCause,
    },
    Victory {
        score: u64,
    },
}
