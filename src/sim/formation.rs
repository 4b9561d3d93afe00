//! Invader formation controller
//!
//! Frame-counted state machine: idles for `interval_frames`, then advances
//! the whole fleet one horizontal step. Reaching a side margin while heading
//! toward it flips the direction, speeds the fleet up and drops it down.

use serde::{Deserialize, Serialize};

use super::state::{Target, TargetKind};
use crate::consts::FIELD_WIDTH;
use crate::tuning::FormationTuning;

/// Horizontal heading of the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Outcome of one advance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationStep {
    pub direction: Direction,
    pub speed: f32,
    /// Direction flipped and the fleet dropped this advance
    pub dropped: bool,
}

/// Fleet movement state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    pub direction: Direction,
    /// Current horizontal step per advance
    pub speed: f32,
    /// Frames since the last advance
    pub frame_counter: u32,
}

impl Formation {
    pub fn new(tuning: &FormationTuning) -> Self {
        Self {
            direction: Direction::Right,
            speed: tuning.initial_speed,
            frame_counter: 0,
        }
    }

    /// Count one frame; advance once the interval is reached
    pub fn update(&mut self, targets: &mut [Target], tuning: &FormationTuning) -> Option<FormationStep> {
        self.frame_counter += 1;
        if self.frame_counter < tuning.interval_frames {
            return None;
        }
        Some(self.advance(targets, tuning))
    }

    /// Move the fleet one step, flipping at the margins
    pub fn advance(&mut self, targets: &mut [Target], tuning: &FormationTuning) -> FormationStep {
        self.frame_counter = 0;

        let mut dropped = false;
        if let Some((left, right)) = horizontal_extent(targets) {
            let crossing = match self.direction {
                Direction::Right => right + self.speed > FIELD_WIDTH - tuning.margin,
                Direction::Left => left - self.speed < tuning.margin,
            };
            if crossing {
                self.direction = self.direction.flipped();
                self.speed += tuning.speed_increment;
                drop_fleet(targets, tuning.drop_step);
                dropped = true;
            }

            let dx = self.direction.sign() * self.speed;
            for invader in targets.iter_mut().filter(|t| !t.destroyed) {
                match &mut invader.kind {
                    // Animating children keep easing; only their slot marches
                    TargetKind::Invader { spawn: Some(anim), .. } => anim.target.x += dx,
                    TargetKind::Invader { spawn: None, .. } => invader.pos.x += dx,
                    TargetKind::Brick => {}
                }
            }
        }

        if dropped {
            log::debug!(
                "Formation flipped {:?}, step speed now {}",
                self.direction,
                self.speed
            );
        }

        FormationStep {
            direction: self.direction,
            speed: self.speed,
            dropped,
        }
    }
}

/// Leftmost and rightmost edge among live, settled invaders
pub fn horizontal_extent(targets: &[Target]) -> Option<(f32, f32)> {
    targets
        .iter()
        .filter(|t| t.is_invader() && t.is_active())
        .map(|t| {
            let b = t.bounds();
            (b.min.x, b.max.x)
        })
        .reduce(|(l, r), (bl, br)| (l.min(bl), r.max(br)))
}

/// Drop every live invader; animating children have their resting slot dropped too
fn drop_fleet(targets: &mut [Target], drop_step: f32) {
    for invader in targets.iter_mut().filter(|t| !t.destroyed) {
        if let TargetKind::Invader { spawn, .. } = &mut invader.kind {
            if let Some(anim) = spawn.as_mut() {
                anim.target.y += drop_step;
            }
            invader.pos.y += drop_step;
        }
    }
}
