//! Game state and core simulation types
//!
//! Everything the simulation step owns for a session lives here. External
//! readers only ever see a settled `GameState` between steps.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::events::GameEvent;
use super::formation::Formation;
use crate::consts::*;
use crate::tuning::{Tuning, Variant};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay (ball may still be attached to the paddle)
    Playing,
    /// Simulation frozen, state kept
    Paused,
    /// Run ended in defeat
    GameOver,
    /// Every target destroyed
    Won,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Won)
    }
}

/// Ball state - riding the paddle or free-flying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    Attached,
    Free,
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: BallState,
}

impl Ball {
    pub fn new(paddle: &Paddle) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            state: BallState::Attached,
        };
        ball.update_attached(paddle);
        ball
    }

    pub fn is_attached(&self) -> bool {
        self.state == BallState::Attached
    }

    /// Bounding square (centre ± radius)
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.pos, Vec2::splat(self.radius * 2.0))
    }

    /// Re-attach to the paddle with zero velocity
    pub fn attach(&mut self, paddle: &Paddle) {
        self.state = BallState::Attached;
        self.update_attached(paddle);
    }

    /// Pin an attached ball just above the paddle
    pub fn update_attached(&mut self, paddle: &Paddle) {
        if self.is_attached() {
            self.pos = Vec2::new(paddle.pos.x, paddle.top() - self.radius - BALL_ATTACH_GAP);
            self.vel = Vec2::ZERO;
        }
    }

    /// Launch from the attached state with a fixed velocity
    pub fn launch(&mut self, velocity: Vec2) -> bool {
        if !self.is_attached() {
            return false;
        }
        self.vel = velocity;
        self.state = BallState::Free;
        true
    }
}

/// Paddle collision shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddleShape {
    /// Axis-aligned rectangle (brick mode)
    Rect,
    /// Circle of radius width / 2 (invader mode)
    Circle,
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Centre of the paddle
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub shape: PaddleShape,
}

impl Paddle {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Bricks => Self {
                pos: Vec2::new(FIELD_WIDTH / 2.0, PADDLE_Y),
                width: PADDLE_WIDTH,
                height: PADDLE_HEIGHT,
                shape: PaddleShape::Rect,
            },
            Variant::Invaders => Self {
                pos: Vec2::new(FIELD_WIDTH / 2.0, PADDLE_Y),
                width: ROUND_PADDLE_WIDTH,
                height: ROUND_PADDLE_WIDTH,
                shape: PaddleShape::Circle,
            },
        }
    }

    /// Collision radius of the circular paddle
    #[inline]
    pub fn radius(&self) -> f32 {
        self.width / 2.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.pos, Vec2::new(self.width, self.height))
    }

    /// Highest point of the paddle surface
    pub fn top(&self) -> f32 {
        match self.shape {
            PaddleShape::Rect => self.pos.y - self.height / 2.0,
            PaddleShape::Circle => self.pos.y - self.radius(),
        }
    }

    /// Move to the pointer, clamped to the playfield
    ///
    /// The rectangular paddle only tracks the pointer horizontally; the
    /// circular paddle also tracks it vertically within the lower half.
    pub fn follow_pointer(&mut self, pointer: Vec2) {
        let half_w = self.width / 2.0;
        self.pos.x = clamp_or_center(pointer.x, half_w, FIELD_WIDTH - half_w);
        if self.shape == PaddleShape::Circle {
            let r = self.radius();
            self.pos.y = clamp_or_center(pointer.y, FIELD_HEIGHT / 2.0 + r, FIELD_HEIGHT - r);
        }
    }
}

/// `f32::clamp` that tolerates NaN input by falling back to the range centre
fn clamp_or_center(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        (min + max) / 2.0
    } else {
        value.clamp(min, max)
    }
}

/// Invader size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvaderTier {
    Large,
    Medium,
    Small,
}

impl InvaderTier {
    /// The tier the two children of a split take
    pub fn child(self) -> Option<InvaderTier> {
        match self {
            InvaderTier::Large => Some(InvaderTier::Medium),
            InvaderTier::Medium => Some(InvaderTier::Small),
            InvaderTier::Small => None,
        }
    }

    pub fn size(self) -> Vec2 {
        match self {
            InvaderTier::Large => Vec2::new(44.0, 32.0),
            InvaderTier::Medium => Vec2::new(30.0, 22.0),
            InvaderTier::Small => Vec2::new(20.0, 15.0),
        }
    }
}

/// Split-child entry animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnAnim {
    pub rotation: f32,
    pub scale: f32,
    /// Resting top-left position the child eases toward
    pub target: Vec2,
}

/// What a target is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetKind {
    Brick,
    Invader {
        tier: InvaderTier,
        /// Present while the child of a split is still animating in
        spawn: Option<SpawnAnim>,
    },
}

/// A destructible target (brick or invader)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub row: u32,
    pub col: u32,
    /// Colour lookup tag for the renderer
    pub color: u32,
    pub destroyed: bool,
    pub kind: TargetKind,
}

impl Target {
    pub fn brick(id: u32, row: u32, col: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            size: Vec2::new(BRICK_WIDTH, BRICK_HEIGHT),
            row,
            col,
            color: row,
            destroyed: false,
            kind: TargetKind::Brick,
        }
    }

    pub fn invader(id: u32, tier: InvaderTier, row: u32, col: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            size: tier.size(),
            row,
            col,
            color: row,
            destroyed: false,
            kind: TargetKind::Invader { tier, spawn: None },
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn tier(&self) -> Option<InvaderTier> {
        match self.kind {
            TargetKind::Invader { tier, .. } => Some(tier),
            TargetKind::Brick => None,
        }
    }

    pub fn is_invader(&self) -> bool {
        matches!(self.kind, TargetKind::Invader { .. })
    }

    pub fn spawn_anim(&self) -> Option<&SpawnAnim> {
        match &self.kind {
            TargetKind::Invader { spawn, .. } => spawn.as_ref(),
            TargetKind::Brick => None,
        }
    }

    pub fn is_spawning(&self) -> bool {
        self.spawn_anim().is_some()
    }

    /// Not destroyed and not animating in
    pub fn is_active(&self) -> bool {
        !self.destroyed && !self.is_spawning()
    }

    /// Points for destroying this target (row-dependent)
    pub fn score_value(&self) -> u64 {
        (self.row as u64 + 1) * ROW_POINTS
    }

    /// Children created when this target is destroyed
    ///
    /// Only large and medium invaders split; both children start at the
    /// parent's centre at near-zero scale and ease apart laterally.
    pub fn split(&self, ids: [u32; 2], rotations: [f32; 2]) -> Vec<Target> {
        let Some(child_tier) = self.tier().and_then(InvaderTier::child) else {
            return Vec::new();
        };
        let child_size = child_tier.size();
        let center = self.center();
        let start = center - child_size / 2.0;
        let targets = [
            Vec2::new(center.x - child_size.x - SPLIT_GAP / 2.0, start.y),
            Vec2::new(center.x + SPLIT_GAP / 2.0, start.y),
        ];

        (0..2)
            .map(|i| Target {
                id: ids[i],
                pos: start,
                size: child_size,
                row: self.row,
                col: self.col,
                color: self.color,
                destroyed: false,
                kind: TargetKind::Invader {
                    tier: child_tier,
                    spawn: Some(SpawnAnim {
                        rotation: rotations[i],
                        scale: SPAWN_INITIAL_SCALE,
                        target: targets[i],
                    }),
                },
            })
            .collect()
    }

    /// Advance the entry animation by one frame
    pub fn advance_spawn(&mut self) {
        let TargetKind::Invader { spawn, .. } = &mut self.kind else {
            return;
        };
        let Some(anim) = spawn.as_mut() else {
            return;
        };

        anim.rotation += SPAWN_ROTATION_STEP;
        anim.scale = (anim.scale + SPAWN_SCALE_STEP).min(1.0);
        self.pos += (anim.target - self.pos) * SPAWN_EASE;

        if self.pos.distance(anim.target) < SPAWN_EPSILON && anim.scale >= SPAWN_SETTLED_SCALE {
            self.pos = anim.target;
            *spawn = None;
        }
    }

    /// Render scale (1.0 once settled)
    pub fn scale(&self) -> f32 {
        self.spawn_anim().map_or(1.0, |a| a.scale)
    }
}

/// Decorative fragment thrown out by a destroyed target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debris {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: u32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// 0-1, decreases every frame
    pub life: f32,
}

impl Debris {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, Vec2::splat(self.size))
    }
}

/// Enemy projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

impl Laser {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Explosion particle (visual only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: f32,
    pub size: f32,
}

/// Paddle warp-in effect (visual only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarpIn {
    pub active: bool,
    pub scale: f32,
    pub opacity: f32,
}

impl WarpIn {
    pub fn trigger(&mut self) {
        self.active = true;
        self.scale = 0.0;
        self.opacity = 0.0;
    }

    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        self.scale = (self.scale + WARP_IN_STEP).min(1.0);
        self.opacity = (self.opacity + WARP_IN_STEP).min(1.0);
        if self.scale >= 1.0 && self.opacity >= 1.0 {
            self.active = false;
        }
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    /// Simulation frame counter (playing frames only)
    pub time_ticks: u64,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Bricks or invaders, in layout order
    pub targets: Vec<Target>,
    pub debris: Vec<Debris>,
    /// At most one laser is ever in flight
    pub laser: Option<Laser>,
    pub particles: Vec<Particle>,
    pub warp_in: WarpIn,
    pub formation: Formation,
    /// Events raised by the last step, drained by the session
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Fresh session: full layout, score 0, starting lives, ball attached
    pub fn new(tuning: Tuning) -> Self {
        let paddle = Paddle::for_variant(tuning.variant);
        let ball = Ball::new(&paddle);
        let mut state = Self {
            phase: GamePhase::Playing,
            score: 0,
            lives: tuning.starting_lives,
            time_ticks: 0,
            formation: Formation::new(&tuning.formation),
            paddle,
            ball,
            targets: Vec::new(),
            debris: Vec::new(),
            laser: None,
            particles: Vec::new(),
            warp_in: WarpIn::default(),
            events: Vec::new(),
            next_id: 1,
            tuning,
        };
        super::tick::generate_layout(&mut state);
        state.warp_in.trigger();
        state
    }

    /// Reset every store to the initial layout, keeping the tuning
    pub fn restart(&mut self) {
        *self = Self::new(self.tuning.clone());
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Targets that are still alive (destroyed ones may linger until frame end)
    pub fn live_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| !t.destroyed)
    }

    pub fn remaining_targets(&self) -> usize {
        self.live_targets().count()
    }

    pub fn lasers(&self) -> impl Iterator<Item = &Laser> {
        self.laser.iter()
    }

    /// Serialize the current snapshot for an external renderer
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
