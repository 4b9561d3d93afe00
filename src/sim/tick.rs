//! Per-frame simulation step
//!
//! Core game loop: advances paddle, cosmetics, formation, projectiles and the
//! ball, resolves each collision category once (first match wins) and settles
//! the frame before anyone gets to read it.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::collision::{
    ball_hits_circular_paddle, ball_hits_rect_paddle, ball_hits_target, bounce_off_circle,
    bounce_off_rect, circular_paddle_normal, debris_hits_paddle, laser_hits_paddle,
    target_hits_paddle,
};
use super::events::{GameEvent, GameOverCause};
use super::state::{Debris, GamePhase, GameState, InvaderTier, Laser, PaddleShape, Particle, Target};
use crate::consts::*;
use crate::tuning::Variant;

/// Input commands consumed at the top of a step
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer position in playfield coordinates
    pub pointer: Option<Vec2>,
    /// Launch the attached ball (click/tap)
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
    /// Reset every store to a fresh session
    pub restart: bool,
}

/// Children of a split, inserted in place of their parent when the frame settles
struct PendingSplit {
    index: usize,
    children: Vec<Target>,
}

/// Advance the game state by one frame
pub fn tick<R: Rng + ?Sized>(state: &mut GameState, input: &TickInput, rng: &mut R) {
    if input.restart {
        state.restart();
        log::info!("Session restarted ({:?})", state.tuning.variant);
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    // Don't tick if paused, over or won
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    let split = simulate(state, input, rng);
    settle(state, split);
}

fn simulate<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    rng: &mut R,
) -> Option<PendingSplit> {
    let invaders = state.tuning.is_invaders();

    if let Some(pointer) = input.pointer {
        state.paddle.follow_pointer(pointer);
    }

    update_cosmetics(state);

    for target in &mut state.targets {
        target.advance_spawn();
    }

    if invaders {
        if let Some(step) = state.formation.update(&mut state.targets, &state.tuning.formation) {
            state.events.push(GameEvent::FormationAdvanced {
                direction: step.direction,
                speed: step.speed,
                dropped: step.dropped,
            });
        }
        if state.tuning.lasers {
            try_fire_laser(state, rng);
        }
    }

    update_debris(state);
    update_laser(state);

    // --- LASER vs PADDLE ---
    let mut life_lost = false;
    if state
        .laser
        .as_ref()
        .is_some_and(|laser| laser_hits_paddle(laser, &state.paddle))
    {
        state.laser = None;
        spawn_explosion(&mut state.particles, state.paddle.pos, PLAYER_COLOR, rng);
        lose_life(state);
        if state.phase != GamePhase::Playing {
            return None;
        }
        life_lost = true;
    }

    // --- INVADERS vs PADDLE / BOTTOM ---
    if invaders {
        if !life_lost {
            let rammed = state
                .targets
                .iter()
                .position(|t| t.is_invader() && target_hits_paddle(t, &state.paddle));
            if let Some(index) = rammed {
                // The rammer is spent so the contact is not resolved again next frame
                state.targets[index].destroyed = true;
                spawn_explosion(&mut state.particles, state.paddle.pos, PLAYER_COLOR, rng);
                lose_life(state);
                if state.phase != GamePhase::Playing {
                    return None;
                }
            }
        }

        let landed = state
            .targets
            .iter()
            .any(|t| t.is_invader() && !t.destroyed && t.bounds().max.y >= FIELD_HEIGHT);
        if landed {
            end_game(state, GameOverCause::InvasionReachedBottom);
            return None;
        }
    }

    // --- BALL ---
    if state.ball.is_attached() {
        if input.launch && state.ball.launch(state.tuning.launch_velocity) {
            state.events.push(GameEvent::BallLaunched);
        } else {
            state.ball.update_attached(&state.paddle);
            return None;
        }
    }

    state.ball.pos += state.ball.vel;
    resolve_walls(state);
    resolve_paddle(state);
    let split = resolve_targets(state, rng);

    if state.ball.pos.y - state.ball.radius > FIELD_HEIGHT {
        spawn_explosion(&mut state.particles, state.ball.pos, PLAYER_COLOR, rng);
        lose_life(state);
    }

    split
}

/// Drop destroyed targets, splice in split children, detect victory
fn settle(state: &mut GameState, split: Option<PendingSplit>) {
    if let Some(PendingSplit { index, children }) = split {
        for (offset, child) in children.into_iter().enumerate() {
            state.targets.insert(index + 1 + offset, child);
        }
    }
    state.targets.retain(|t| !t.destroyed);

    if state.phase == GamePhase::Playing && state.remaining_targets() == 0 {
        state.phase = GamePhase::Won;
        state.events.push(GameEvent::Victory { score: state.score });
        log::info!("Victory! Final score {}", state.score);
    }
}

/// Warp-in easing and explosion particles
fn update_cosmetics(state: &mut GameState) {
    state.warp_in.update();

    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.vel *= EXPLOSION_DRAG;
        particle.life -= EXPLOSION_LIFE_DECAY;
        // Shrink as they die
        particle.size *= 0.98;
    }
    state.particles.retain(|p| p.life > 0.0);
}

/// On the laser cadence, maybe fire from a random settled invader
fn try_fire_laser<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let cadence = u64::from(state.tuning.laser.interval_frames.max(1));
    if state.laser.is_some() || !state.time_ticks.is_multiple_of(cadence) {
        return;
    }
    if !rng.random_bool(state.tuning.laser.fire_chance.clamp(0.0, 1.0)) {
        return;
    }

    let shooters: Vec<&Target> = state
        .targets
        .iter()
        .filter(|t| t.is_invader() && t.is_active())
        .collect();
    let Some(shooter) = shooters.choose(rng) else {
        return;
    };

    let bounds = shooter.bounds();
    let pos = Vec2::new(bounds.center().x - LASER_WIDTH / 2.0, bounds.max.y);
    state.laser = Some(Laser {
        pos,
        size: Vec2::new(LASER_WIDTH, LASER_HEIGHT),
        speed: state.tuning.laser.speed,
    });
    state.events.push(GameEvent::LaserFired { pos });
    log::debug!("Laser fired from ({:.0}, {:.0})", pos.x, pos.y);
}

fn update_laser(state: &mut GameState) {
    if let Some(laser) = state.laser.as_mut() {
        laser.pos.y += laser.speed;
        if laser.pos.y > FIELD_HEIGHT {
            state.laser = None;
        }
    }
}

/// Gravity, paddle bounce, wall bounce, expiry
fn update_debris(state: &mut GameState) {
    let paddle = &state.paddle;
    let paddle_top = paddle.top();

    for piece in state.debris.iter_mut() {
        piece.vel.y += DEBRIS_GRAVITY;
        piece.pos += piece.vel;
        piece.rotation += piece.rotation_speed;
        piece.life -= DEBRIS_LIFE_DECAY;

        if piece.vel.y > 0.0 && debris_hits_paddle(piece, paddle) {
            piece.vel.y = -piece.vel.y * DEBRIS_BOUNCE_DAMPING;
            piece.vel.x *= DEBRIS_FRICTION;
            piece.pos.y = paddle_top - piece.size;
        }

        if piece.pos.x <= 0.0 {
            piece.pos.x = 0.0;
            piece.vel.x = piece.vel.x.abs() * DEBRIS_WALL_DAMPING;
        } else if piece.pos.x + piece.size >= FIELD_WIDTH {
            piece.pos.x = FIELD_WIDTH - piece.size;
            piece.vel.x = -piece.vel.x.abs() * DEBRIS_WALL_DAMPING;
        }
    }

    state
        .debris
        .retain(|d| d.life > 0.0 && d.pos.y <= FIELD_HEIGHT);
}

/// Side walls and ceiling; the floor is handled as a lost ball
fn resolve_walls(state: &mut GameState) {
    let ball = &mut state.ball;
    let mut hit = false;

    if ball.pos.x - ball.radius <= 0.0 {
        ball.pos.x = ball.radius;
        ball.vel.x = ball.vel.x.abs();
        hit = true;
    } else if ball.pos.x + ball.radius >= FIELD_WIDTH {
        ball.pos.x = FIELD_WIDTH - ball.radius;
        ball.vel.x = -ball.vel.x.abs();
        hit = true;
    }

    if ball.pos.y - ball.radius <= 0.0 {
        ball.pos.y = ball.radius;
        ball.vel.y = ball.vel.y.abs();
        hit = true;
    }

    if hit {
        state.events.push(GameEvent::WallHit);
    }
}

fn resolve_paddle(state: &mut GameState) {
    let paddle = &state.paddle;
    let ball = &mut state.ball;
    let max_speed = state.tuning.ball_max_speed;

    let hit = match paddle.shape {
        PaddleShape::Circle => {
            let normal = circular_paddle_normal(ball.pos, paddle.pos);
            // Upper half only, and only while approaching, so one contact bounces once
            if normal.y < 0.0
                && ball.vel.dot(normal) < 0.0
                && ball_hits_circular_paddle(ball, paddle)
            {
                ball.vel = bounce_off_circle(ball.vel, normal, max_speed);
                ball.pos = paddle.pos + normal * (paddle.radius() + ball.radius);
                true
            } else {
                false
            }
        }
        PaddleShape::Rect => {
            if ball.vel.y > 0.0 && ball_hits_rect_paddle(ball, paddle) {
                let offset = (ball.pos.x - paddle.pos.x) / (paddle.width / 2.0);
                ball.vel = bounce_off_rect(ball.vel, offset, state.tuning.paddle_english, max_speed);
                ball.pos.y = paddle.top() - ball.radius;
                true
            } else {
                false
            }
        }
    };

    if hit {
        state.events.push(GameEvent::PaddleHit);
    }
}

/// First settled target touching the ball is destroyed; one per frame
fn resolve_targets<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Option<PendingSplit> {
    let index = state
        .targets
        .iter()
        .position(|t| !t.is_spawning() && ball_hits_target(&state.ball, t))?;

    state.ball.vel.y = -state.ball.vel.y;

    let target = &mut state.targets[index];
    target.destroyed = true;
    let center = target.center();
    let color = target.color;
    let row = target.row;
    let tier = target.tier();
    let points = target.score_value();

    spawn_explosion(&mut state.particles, center, color, rng);
    spawn_debris(&mut state.debris, center, color, rng);
    state.score += points;
    state.events.push(GameEvent::TargetDestroyed {
        row,
        tier,
        pos: center,
        points,
    });

    let splits = state.tuning.splitting && tier.and_then(InvaderTier::child).is_some();
    if !splits {
        return None;
    }

    let ids = [state.next_entity_id(), state.next_entity_id()];
    let rotations = [rng.random_range(0.0..TAU), rng.random_range(0.0..TAU)];
    let children = state.targets[index].split(ids, rotations);
    Some(PendingSplit { index, children })
}

/// Shared life-loss path
fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::LifeLost { lives: state.lives });

    if state.lives == 0 {
        end_game(state, GameOverCause::LivesExhausted);
        return;
    }

    state.ball.attach(&state.paddle);
    state.warp_in.trigger();
    state.laser = None;
    log::debug!("Life lost, {} remaining", state.lives);
}

fn end_game(state: &mut GameState, cause: GameOverCause) {
    state.phase = GamePhase::GameOver;
    state.events.push(GameEvent::GameOver {
        score: state.score,
        cause,
    });
    log::info!("Game over ({:?}), final score {}", cause, state.score);
}

fn spawn_explosion<R: Rng + ?Sized>(particles: &mut Vec<Particle>, at: Vec2, color: u32, rng: &mut R) {
    for _ in 0..EXPLOSION_PARTICLES {
        if particles.len() >= MAX_PARTICLES {
            break;
        }
        let angle: f32 = rng.random_range(0.0..TAU);
        let speed: f32 = rng.random_range(1.0..4.0);
        particles.push(Particle {
            pos: at,
            vel: Vec2::from_angle(angle) * speed,
            color,
            life: 1.0,
            size: rng.random_range(2.0..5.0),
        });
    }
}

fn spawn_debris<R: Rng + ?Sized>(debris: &mut Vec<Debris>, at: Vec2, color: u32, rng: &mut R) {
    let count = rng.random_range(DEBRIS_MIN_PIECES..=DEBRIS_MAX_PIECES);
    for _ in 0..count {
        if debris.len() >= MAX_DEBRIS {
            break;
        }
        let size: f32 = rng.random_range(3.0..7.0);
        debris.push(Debris {
            pos: at - Vec2::splat(size / 2.0),
            vel: Vec2::new(rng.random_range(-3.0..3.0), rng.random_range(-5.0..-1.0)),
            size,
            color,
            rotation: rng.random_range(0.0..TAU),
            rotation_speed: rng.random_range(-0.2..0.2),
            life: 1.0,
        });
    }
}

/// Build the fixed level layout for the session's variant
pub fn generate_layout(state: &mut GameState) {
    state.targets.clear();

    match state.tuning.variant {
        Variant::Bricks => {
            for row in 0..BRICK_ROWS {
                for col in 0..BRICK_COLS {
                    let pos = Vec2::new(
                        BRICK_LEFT + col as f32 * (BRICK_WIDTH + BRICK_PADDING),
                        BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_PADDING),
                    );
                    let id = state.next_entity_id();
                    state.targets.push(Target::brick(id, row, col, pos));
                }
            }
        }
        Variant::Invaders => {
            for row in 0..INVADER_ROWS {
                for col in 0..INVADER_COLS {
                    let pos = Vec2::new(
                        INVADER_LEFT + col as f32 * INVADER_H_SPACING,
                        INVADER_TOP + row as f32 * INVADER_V_SPACING,
                    );
                    let id = state.next_entity_id();
                    state
                        .targets
                        .push(Target::invader(id, InvaderTier::Large, row, col, pos));
                }
            }
        }
    }

    log::info!(
        "Layout {:?}: {} targets",
        state.tuning.variant,
        state.targets.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BallState;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(12345)
    }

    fn free_ball(state: &mut GameState, pos: Vec2, vel: Vec2) {
        state.ball.state = BallState::Free;
        state.ball.pos = pos;
        state.ball.vel = vel;
    }

    fn quiet_invaders() -> Tuning {
        Tuning {
            lasers: false,
            ..Tuning::invaders()
        }
    }

    fn count<F: Fn(&GameEvent) -> bool>(state: &GameState, f: F) -> usize {
        state.events.iter().filter(|e| f(e)).count()
    }

    #[test]
    fn test_launch_sets_fixed_velocity() {
        let mut state = GameState::new(Tuning::bricks());
        let mut rng = rng();

        tick(&mut state, &TickInput::default(), &mut rng);
        assert!(state.ball.is_attached());
        assert_eq!(state.ball.vel, Vec2::ZERO);

        let launch = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut state, &launch, &mut rng);
        assert_eq!(state.ball.state, BallState::Free);
        assert_eq!(state.ball.vel, state.tuning.launch_velocity);
        assert_eq!(count(&state, |e| *e == GameEvent::BallLaunched), 1);
    }

    #[test]
    fn test_attached_ball_follows_paddle() {
        let mut state = GameState::new(Tuning::bricks());
        let input = TickInput {
            pointer: Some(Vec2::new(200.0, 100.0)),
            ..Default::default()
        };
        tick(&mut state, &input, &mut rng());
        assert_eq!(state.paddle.pos.x, 200.0);
        assert_eq!(state.ball.pos.x, 200.0);
        assert!(state.ball.pos.y < state.paddle.top());
    }

    #[test]
    fn test_row_zero_hit_scores_ten() {
        let mut state = GameState::new(Tuning::bricks());
        state.targets.retain(|t| t.row == 0);
        let first = state.targets[0].bounds();
        free_ball(
            &mut state,
            Vec2::new(first.center().x, first.max.y + 10.0),
            Vec2::new(0.0, -4.0),
        );

        tick(&mut state, &TickInput::default(), &mut rng());

        assert_eq!(state.score, 10);
        assert_eq!(state.ball.vel.y, 4.0);
        assert_eq!(state.targets.len(), (BRICK_COLS - 1) as usize);
        assert!((8..=12).contains(&state.debris.len()));
        assert!(!state.particles.is_empty());
        assert_eq!(
            count(&state, |e| matches!(
                e,
                GameEvent::TargetDestroyed {
                    row: 0,
                    tier: None,
                    points: 10,
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn test_only_one_target_per_frame() {
        let mut state = GameState::new(Tuning::bricks());
        // Ball straddles two bricks of the same row
        let a = state.targets[0].bounds();
        free_ball(
            &mut state,
            Vec2::new(a.max.x + BRICK_PADDING / 2.0, a.max.y + 6.0),
            Vec2::new(0.0, -4.0),
        );

        tick(&mut state, &TickInput::default(), &mut rng());
        assert_eq!(count(&state, |e| matches!(e, GameEvent::TargetDestroyed { .. })), 1);
        assert_eq!(state.targets.len(), (BRICK_ROWS * BRICK_COLS - 1) as usize);
    }

    #[test]
    fn test_ball_lost_with_last_life_ends_game() {
        let mut state = GameState::new(Tuning::bricks());
        state.lives = 1;
        state.score = 120;
        free_ball(&mut state, Vec2::new(100.0, FIELD_HEIGHT + 20.0), Vec2::new(0.0, 5.0));

        tick(&mut state, &TickInput::default(), &mut rng());

        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver {
            score: 120,
            cause: GameOverCause::LivesExhausted,
        }));
    }

    #[test]
    fn test_life_loss_reattaches_ball() {
        let mut state = GameState::new(Tuning::invaders());
        for _ in 0..40 {
            state.warp_in.update();
        }
        assert!(!state.warp_in.active);
        free_ball(&mut state, Vec2::new(100.0, FIELD_HEIGHT + 20.0), Vec2::new(0.0, 5.0));

        tick(&mut state, &TickInput::default(), &mut rng());

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 2);
        assert!(state.ball.is_attached());
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert!(state.warp_in.active);
        assert!(state.laser.is_none());
        assert!(state.events.contains(&GameEvent::LifeLost { lives: 2 }));
    }

    #[test]
    fn test_victory_fires_once() {
        let mut state = GameState::new(Tuning::bricks());
        state.targets.truncate(1);
        let only = state.targets[0].bounds();
        free_ball(
            &mut state,
            Vec2::new(only.center().x, only.max.y + 10.0),
            Vec2::new(0.0, -4.0),
        );

        let mut rng = rng();
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), &mut rng);
        }

        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(count(&state, |e| matches!(e, GameEvent::Victory { score: 10 })), 1);
    }

    #[test]
    fn test_pause_freezes_and_resumes() {
        let mut state = GameState::new(Tuning::bricks());
        let mut rng = rng();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut state, &pause, &mut rng);
        assert_eq!(state.phase, GamePhase::Paused);
        let frozen_at = state.time_ticks;

        let input = TickInput {
            pointer: Some(Vec2::new(100.0, 0.0)),
            launch: true,
            ..Default::default()
        };
        tick(&mut state, &input, &mut rng);
        assert_eq!(state.time_ticks, frozen_at);
        assert!(state.ball.is_attached());

        tick(&mut state, &pause, &mut rng);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, frozen_at + 1);
    }

    #[test]
    fn test_restart_resets_session() {
        let mut state = GameState::new(Tuning::invaders());
        state.score = 500;
        state.lives = 1;
        state.formation.speed = 40.0;
        state.targets.truncate(3);
        state.phase = GamePhase::GameOver;

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, &mut rng());

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.formation.speed, state.tuning.formation.initial_speed);
        assert_eq!(state.targets.len(), (INVADER_ROWS * INVADER_COLS) as usize);
        assert!(state.ball.is_attached());
    }

    #[test]
    fn test_large_invader_splits_in_place() {
        let mut state = GameState::new(quiet_invaders());
        let parent_id = state.targets[0].id;
        let parent = state.targets[0].bounds();
        free_ball(
            &mut state,
            Vec2::new(parent.center().x, parent.max.y + 11.0),
            Vec2::new(0.0, -4.0),
        );

        tick(&mut state, &TickInput::default(), &mut rng());

        assert_eq!(state.score, 10);
        assert_eq!(state.targets.len(), (INVADER_ROWS * INVADER_COLS + 1) as usize);
        assert!(state.targets.iter().all(|t| t.id != parent_id));
        for child in &state.targets[0..2] {
            assert_eq!(child.tier(), Some(InvaderTier::Medium));
            assert!(child.is_spawning());
            assert!(child.scale() < 0.1);
        }
        assert_eq!(state.targets[2].tier(), Some(InvaderTier::Large));
    }

    #[test]
    fn test_split_children_settle_to_full_scale() {
        let mut state = GameState::new(quiet_invaders());
        let parent = state.targets[0].bounds();
        free_ball(
            &mut state,
            Vec2::new(parent.center().x, parent.max.y + 11.0),
            Vec2::new(0.0, -4.0),
        );
        let mut rng = rng();
        tick(&mut state, &TickInput::default(), &mut rng);

        // Park the ball so it cannot interfere
        state.ball.attach(&state.paddle);
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), &mut rng);
        }
        for child in &state.targets[0..2] {
            assert!(!child.is_spawning());
            assert_eq!(child.scale(), 1.0);
        }
    }

    #[test]
    fn test_small_invader_and_no_split_variant_never_split() {
        let mut state = GameState::new(quiet_invaders());
        let pos = state.targets[0].pos;
        let id = state.targets[0].id;
        state.targets[0] = Target::invader(id, InvaderTier::Small, 0, 0, pos);
        let small = state.targets[0].bounds();
        free_ball(
            &mut state,
            Vec2::new(small.center().x, small.max.y + 10.0),
            Vec2::new(0.0, -4.0),
        );
        tick(&mut state, &TickInput::default(), &mut rng());
        assert_eq!(state.targets.len(), (INVADER_ROWS * INVADER_COLS - 1) as usize);

        let mut state = GameState::new(Tuning {
            splitting: false,
            ..quiet_invaders()
        });
        let large = state.targets[0].bounds();
        free_ball(
            &mut state,
            Vec2::new(large.center().x, large.max.y + 11.0),
            Vec2::new(0.0, -4.0),
        );
        tick(&mut state, &TickInput::default(), &mut rng());
        assert_eq!(state.targets.len(), (INVADER_ROWS * INVADER_COLS - 1) as usize);
    }

    #[test]
    fn test_ball_ignores_spawning_children() {
        let mut state = GameState::new(quiet_invaders());
        let parent = state.targets[0].clone();
        state.targets = parent.split([900, 901], [0.0, 0.0]);
        let child = state.targets[0].bounds();
        free_ball(&mut state, child.center(), Vec2::new(0.0, -1.0));

        tick(&mut state, &TickInput::default(), &mut rng());
        assert_eq!(state.targets.len(), 2);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_at_most_one_laser() {
        let mut tuning = Tuning::invaders();
        tuning.laser.interval_frames = 1;
        tuning.laser.fire_chance = 1.0;
        let mut state = GameState::new(tuning);
        let mut rng = rng();

        // Short enough that no laser can reach the paddle
        let mut fired = 0;
        for _ in 0..40 {
            tick(&mut state, &TickInput::default(), &mut rng);
            assert!(state.lasers().count() <= 1);
            fired += count(&state, |e| matches!(e, GameEvent::LaserFired { .. }));
            state.events.clear();
        }
        assert_eq!(fired, 1);
        assert!(state.laser.is_some());
    }

    #[test]
    fn test_laser_starts_under_shooter() {
        let mut tuning = Tuning::invaders();
        tuning.laser.interval_frames = 1;
        tuning.laser.fire_chance = 1.0;
        let mut state = GameState::new(tuning);
        state.targets.truncate(1);

        tick(&mut state, &TickInput::default(), &mut rng());

        let shooter = state.targets[0].bounds();
        let laser = state.laser.as_ref().unwrap();
        assert_eq!(laser.pos.x + laser.size.x / 2.0, shooter.center().x);
        assert_eq!(laser.pos.y, shooter.max.y + laser.speed);
    }

    #[test]
    fn test_laser_disabled_never_fires() {
        let mut tuning = quiet_invaders();
        tuning.laser.interval_frames = 1;
        tuning.laser.fire_chance = 1.0;
        let mut state = GameState::new(tuning);
        let mut rng = rng();
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), &mut rng);
        }
        assert!(state.laser.is_none());
    }

    #[test]
    fn test_laser_hit_costs_life() {
        let mut state = GameState::new(quiet_invaders());
        state.laser = Some(Laser {
            pos: Vec2::new(state.paddle.pos.x - LASER_WIDTH / 2.0, state.paddle.top() - 12.0),
            size: Vec2::new(LASER_WIDTH, LASER_HEIGHT),
            speed: 5.0,
        });

        tick(&mut state, &TickInput::default(), &mut rng());

        assert!(state.laser.is_none());
        assert_eq!(state.lives, 2);
        assert!(state.ball.is_attached());
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_laser_leaves_playfield() {
        let mut state = GameState::new(quiet_invaders());
        state.laser = Some(Laser {
            pos: Vec2::new(50.0, FIELD_HEIGHT - 2.0),
            size: Vec2::new(LASER_WIDTH, LASER_HEIGHT),
            speed: 5.0,
        });
        tick(&mut state, &TickInput::default(), &mut rng());
        assert!(state.laser.is_none());
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_invader_ramming_paddle_costs_life() {
        let mut state = GameState::new(quiet_invaders());
        let rammer_id = state.targets[0].id;
        state.targets[0].pos = state.paddle.pos - Vec2::new(10.0, 10.0);

        tick(&mut state, &TickInput::default(), &mut rng());

        assert_eq!(state.lives, 2);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.targets.iter().all(|t| t.id != rammer_id));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_invasion_reaching_bottom_ends_game() {
        let mut state = GameState::new(quiet_invaders());
        state.targets[0].pos.y = FIELD_HEIGHT - 20.0;

        tick(&mut state, &TickInput::default(), &mut rng());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 3);
        assert!(state.events.contains(&GameEvent::GameOver {
            score: 0,
            cause: GameOverCause::InvasionReachedBottom,
        }));
    }

    #[test]
    fn test_formation_advances_on_interval() {
        let mut state = GameState::new(quiet_invaders());
        let start_x = state.targets[0].pos.x;
        let mut rng = rng();
        for _ in 0..state.tuning.formation.interval_frames {
            tick(&mut state, &TickInput::default(), &mut rng);
        }
        assert_eq!(state.targets[0].pos.x, start_x + state.tuning.formation.initial_speed);
        assert_eq!(
            count(&state, |e| matches!(e, GameEvent::FormationAdvanced { dropped: false, .. })),
            1
        );
    }

    #[test]
    fn test_circular_paddle_bounce() {
        let mut state = GameState::new(quiet_invaders());
        let paddle = state.paddle.pos;
        free_ball(&mut state, paddle + Vec2::new(5.0, -41.0), Vec2::new(0.0, 4.0));

        tick(&mut state, &TickInput::default(), &mut rng());

        assert!(state.ball.vel.y < 0.0);
        assert!(state.ball.vel.x > 0.0);
        assert!(state.ball.vel.length() <= state.tuning.ball_max_speed + 1e-4);
        assert!(state.events.contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_rising_ball_under_round_paddle_passes_through() {
        let mut state = GameState::new(quiet_invaders());
        let paddle = state.paddle.pos;
        free_ball(&mut state, paddle + Vec2::new(0.0, 40.0), Vec2::new(0.0, -5.0));
        let mut rng = rng();

        let mut hits = 0;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), &mut rng);
            hits += count(&state, |e| *e == GameEvent::PaddleHit);
            state.events.clear();
        }

        assert_eq!(hits, 0);
        assert_eq!(state.ball.vel, Vec2::new(0.0, -5.0));
        assert!(state.ball.pos.y < state.paddle.top() - state.ball.radius);
        assert_eq!(state.lives, state.tuning.starting_lives);
    }

    #[test]
    fn test_rect_paddle_bounce_kicks_toward_edge() {
        let mut state = GameState::new(Tuning::bricks());
        let paddle = state.paddle.clone();
        free_ball(&mut state, Vec2::new(paddle.pos.x + 40.0, 540.0), Vec2::new(0.0, 5.0));

        tick(&mut state, &TickInput::default(), &mut rng());

        assert!(state.ball.vel.y < 0.0);
        assert!(state.ball.vel.x > 0.0);
        assert_eq!(state.ball.pos.y, paddle.top() - state.ball.radius);
        assert!(state.events.contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_wall_bounce() {
        let mut state = GameState::new(Tuning::bricks());
        free_ball(&mut state, Vec2::new(10.0, 300.0), Vec2::new(-4.0, 1.0));

        tick(&mut state, &TickInput::default(), &mut rng());

        assert_eq!(state.ball.vel.x, 4.0);
        assert_eq!(state.ball.pos.x, state.ball.radius);
        assert!(state.events.contains(&GameEvent::WallHit));
    }

    #[test]
    fn test_debris_bounces_off_paddle_and_walls() {
        let mut state = GameState::new(Tuning::bricks());
        let top = state.paddle.top();
        state.debris.push(Debris {
            pos: Vec2::new(state.paddle.pos.x, top - 4.0),
            vel: Vec2::new(1.0, 3.0),
            size: 4.0,
            color: 0,
            rotation: 0.0,
            rotation_speed: 0.1,
            life: 1.0,
        });
        state.debris.push(Debris {
            pos: Vec2::new(1.0, 300.0),
            vel: Vec2::new(-3.0, 0.0),
            size: 4.0,
            color: 0,
            rotation: 0.0,
            rotation_speed: 0.0,
            life: 1.0,
        });

        update_debris(&mut state);

        assert!(state.debris[0].vel.y < 0.0);
        assert_eq!(state.debris[0].pos.y, top - 4.0);
        assert!(state.debris[1].vel.x > 0.0);
        assert_eq!(state.debris[1].pos.x, 0.0);
    }

    #[test]
    fn test_debris_below_playfield_is_removed() {
        let mut state = GameState::new(Tuning::bricks());
        state.debris.push(Debris {
            pos: Vec2::new(50.0, FIELD_HEIGHT - 1.0),
            vel: Vec2::new(0.0, 3.0),
            size: 4.0,
            color: 0,
            rotation: 0.0,
            rotation_speed: 0.0,
            life: 1.0,
        });

        update_debris(&mut state);
        assert!(state.debris.is_empty());
    }

    #[test]
    fn test_debris_and_particles_expire() {
        let mut state = GameState::new(Tuning::bricks());
        state.targets.retain(|t| t.row == 0);
        let first = state.targets[0].bounds();
        free_ball(
            &mut state,
            Vec2::new(first.center().x, first.max.y + 10.0),
            Vec2::new(0.0, -4.0),
        );
        let mut rng = rng();
        tick(&mut state, &TickInput::default(), &mut rng);
        assert!(!state.debris.is_empty());

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), &mut rng);
        }
        assert!(state.debris.is_empty());
        assert!(state.particles.is_empty());
    }
}
