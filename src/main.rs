//! Brick Invaders headless runner
//!
//! Plays one session on autopilot and logs what happens.
//!
//! Usage: `brick-invaders [tuning.json] [seed]` (`RUST_LOG=debug` for events)

#[cfg(not(target_arch = "wasm32"))]
use brick_invaders::consts::{FIELD_HEIGHT, PADDLE_Y, SIM_DT};
#[cfg(not(target_arch = "wasm32"))]
use brick_invaders::sim::{GameEvent, GameState};
#[cfg(not(target_arch = "wasm32"))]
use brick_invaders::{FrameSink, LogSink, Session, Tuning};

/// Ten minutes of play at 60 Hz
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Forwards to the log and keeps a tally for the summary
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct DemoSink {
    log: LogSink,
    destroyed: u32,
    lives_lost: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameSink for DemoSink {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::TargetDestroyed { .. } => self.destroyed += 1,
            GameEvent::LifeLost { .. } => self.lives_lost += 1,
            _ => {}
        }
        self.log.on_event(event);
    }

    fn on_frame(&mut self, state: &GameState) {
        if state.time_ticks > 0 && state.time_ticks.is_multiple_of(600) {
            log::info!(
                "t={:.0}s score={} lives={} targets={}",
                state.time_ticks as f32 * SIM_DT,
                state.score,
                state.lives,
                state.remaining_targets()
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let mut session = Session::new(tuning, seed);
    let mut sink = DemoSink::default();

    let mut frames = 0;
    while frames < MAX_FRAMES && !session.state().phase.is_terminal() {
        // Keep the paddle under the ball, slightly off-centre so bounces angle
        let ball = session.state().ball.pos;
        let y = if ball.y > FIELD_HEIGHT / 2.0 { ball.y + 20.0 } else { PADDLE_Y };
        session.set_pointer(ball.x + 6.0, y);
        if session.state().ball.is_attached() {
            session.launch();
        }
        session.frame(&mut sink);
        frames += 1;
    }

    let state = session.state();
    log::info!(
        "Finished after {} frames: {:?}, score {}, {} targets destroyed, {} lives lost",
        frames,
        state.phase,
        state.score,
        sink.destroyed,
        sink.lives_lost
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; hosts embed `Session` directly
}
