//! Collision detection and response
//!
//! Stateless predicates between the ball, the paddle (rectangular or
//! circular) and axis-aligned targets, plus the velocity responses used when
//! the ball bounces. Callers exclude invalid candidates (spawning targets,
//! attached balls) before asking.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Ball, Debris, Laser, Paddle, PaddleShape, Target};
use crate::consts::BALL_MIN_UPWARD_SPEED;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Rectangle from its top-left corner and size
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size / 2.0, size)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Standard AABB overlap test (touching edges do not overlap)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            Vec2::new(self.min.x, self.max.y),
            self.max,
        ]
    }
}

/// Ball centre within ball.radius + paddle.radius of the paddle centre
pub fn ball_hits_circular_paddle(ball: &Ball, paddle: &Paddle) -> bool {
    ball.pos.distance(paddle.pos) <= ball.radius + paddle.radius()
}

/// Ball bounding square overlaps the rectangle
pub fn ball_hits_rect(ball: &Ball, rect: &Rect) -> bool {
    ball.bounds().overlaps(rect)
}

pub fn ball_hits_rect_paddle(ball: &Ball, paddle: &Paddle) -> bool {
    ball_hits_rect(ball, &paddle.bounds())
}

/// Ball overlaps a target that is not already destroyed
pub fn ball_hits_target(ball: &Ball, target: &Target) -> bool {
    !target.destroyed && ball_hits_rect(ball, &target.bounds())
}

/// Point inside the paddle's hit area
pub fn point_hits_paddle(point: Vec2, paddle: &Paddle) -> bool {
    match paddle.shape {
        PaddleShape::Rect => paddle.bounds().contains(point),
        PaddleShape::Circle => point.distance(paddle.pos) <= paddle.radius(),
    }
}

/// Rectangle intersects the paddle's hit area
///
/// Against the circular paddle only the rectangle's corners are tested.
pub fn rect_hits_paddle(rect: &Rect, paddle: &Paddle) -> bool {
    match paddle.shape {
        PaddleShape::Rect => rect.overlaps(&paddle.bounds()),
        PaddleShape::Circle => rect.corners().iter().any(|&c| point_hits_paddle(c, paddle)),
    }
}

pub fn debris_hits_paddle(debris: &Debris, paddle: &Paddle) -> bool {
    rect_hits_paddle(&debris.bounds(), paddle)
}

/// Laser overlaps the paddle (its leading tip counts against the circle)
pub fn laser_hits_paddle(laser: &Laser, paddle: &Paddle) -> bool {
    let bounds = laser.bounds();
    let tip = Vec2::new(bounds.center().x, bounds.max.y);
    point_hits_paddle(tip, paddle) || rect_hits_paddle(&bounds, paddle)
}

/// A live, settled target touching the paddle
pub fn target_hits_paddle(target: &Target, paddle: &Paddle) -> bool {
    target.is_active() && rect_hits_paddle(&target.bounds(), paddle)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Force a strictly upward (negative y) vertical component
#[inline]
pub fn force_upward(velocity: Vec2) -> Vec2 {
    Vec2::new(velocity.x, -velocity.y.abs().max(BALL_MIN_UPWARD_SPEED))
}

/// Scale velocity down so its magnitude never exceeds `max_speed`
#[inline]
pub fn clamp_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    let speed = velocity.length();
    if speed > max_speed {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}

/// Surface normal of the circular paddle at the ball (paddle centre → ball)
pub fn circular_paddle_normal(ball_pos: Vec2, paddle_pos: Vec2) -> Vec2 {
    (ball_pos - paddle_pos).try_normalize().unwrap_or(Vec2::NEG_Y)
}

/// Bounce off the circular paddle: reflect, force upward, clamp
pub fn bounce_off_circle(velocity: Vec2, normal: Vec2, max_speed: f32) -> Vec2 {
    clamp_speed(force_upward(reflect_velocity(velocity, normal)), max_speed)
}

/// Bounce off the rectangular paddle
///
/// `hit_offset` is where along the paddle the ball struck, -1 at the left
/// edge to 1 at the right edge; the horizontal kick grows toward the edges.
pub fn bounce_off_rect(velocity: Vec2, hit_offset: f32, english: f32, max_speed: f32) -> Vec2 {
    let kicked = Vec2::new(velocity.x + hit_offset.clamp(-1.0, 1.0) * english, velocity.y);
    clamp_speed(force_upward(kicked), max_speed)
}
