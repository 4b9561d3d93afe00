//! Host-side session driver
//!
//! Owns the game state, the seeded RNG and the latched input. Hosts feed
//! pointer and button input in whenever it arrives, then call `frame` once
//! per display frame (or `advance` with elapsed wall time) and receive the
//! step's events followed by one snapshot through a `FrameSink`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{GameEvent, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Receiver for everything a step publishes (audio, HUD, renderer)
pub trait FrameSink {
    /// Called once per event raised during the step, in order
    fn on_event(&mut self, _event: &GameEvent) {}

    /// Called exactly once after the step's events
    fn on_frame(&mut self, _state: &GameState) {}
}

/// Sink that writes every event to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl FrameSink for LogSink {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::GameOver { .. } | GameEvent::Victory { .. } => log::info!("{event:?}"),
            _ => log::debug!("{event:?}"),
        }
    }
}

/// One playable session
pub struct Session<R = Pcg32> {
    state: GameState,
    input: TickInput,
    rng: R,
    accumulator: f32,
}

impl Session<Pcg32> {
    /// New session with a reproducible RNG
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_rng(tuning, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(tuning: Tuning, rng: R) -> Self {
        log::info!(
            "Starting {:?} session (splitting: {}, lasers: {})",
            tuning.variant,
            tuning.splitting,
            tuning.lasers
        );
        Self {
            state: GameState::new(tuning),
            input: TickInput::default(),
            rng,
            accumulator: 0.0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Latest pointer position in playfield coordinates
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.input.pointer = Some(Vec2::new(x, y));
    }

    pub fn launch(&mut self) {
        self.input.launch = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
        self.accumulator = 0.0;
    }

    /// Run one simulation step and publish it
    pub fn frame<S: FrameSink + ?Sized>(&mut self, sink: &mut S) {
        tick(&mut self.state, &self.input, &mut self.rng);

        // Clear one-shot inputs after processing; the pointer stays latched
        self.input.launch = false;
        self.input.pause = false;
        self.input.restart = false;

        for event in self.state.events.drain(..) {
            sink.on_event(&event);
        }
        sink.on_frame(&self.state);
    }

    /// Fixed-timestep catch-up for hosts not refreshing at 60 Hz
    ///
    /// Returns the number of steps run.
    pub fn advance<S: FrameSink + ?Sized>(&mut self, elapsed: f32, sink: &mut S) -> u32 {
        // A bogus host clock counts as no time passing
        let dt = if elapsed.is_finite() { elapsed.clamp(0.0, 0.1) } else { 0.0 };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.frame(sink);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop time we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }
}
