//! Engine contract and host loop
//!
//! A host screen owns one [`Runner`] per active game. The runner buffers
//! input between ticks, advances the engine on its clock and forwards the
//! terminal outcome to the registered callback exactly once per run.

use super::state::{GameId, Lifecycle, Outcome, RunPhase};
use crate::consts::{MAX_FRAME_DELTA, MAX_SUBSTEPS};

/// How an engine's logical time advances
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clock {
    /// One tick every `step` seconds of wall time, independent of frame rate
    Fixed(f32),
    /// One tick per rendered frame (or per input event)
    PerFrame,
}

/// Buffered input for a single tick
pub trait TickInput: Default + Clone {
    /// Clear one-shot flags (jump, pause, queued move) once a tick consumed them
    fn clear_one_shots(&mut self);
}

/// The contract every mini-game exposes to its host
pub trait Engine {
    type Input: TickInput;
    /// Read-only renderable state
    type State;

    const CLOCK: Clock;

    /// Reinitialize to the configured starting layout
    fn reset(&mut self);

    /// Advance one logical step
    fn tick(&mut self, input: &Self::Input);

    fn state(&self) -> &Self::State;

    fn score(&self) -> u64;

    fn lifecycle(&self) -> &Lifecycle;

    /// Outcome of a finished run, handed out once
    fn take_outcome(&mut self) -> Option<Outcome>;

    fn game(&self) -> GameId {
        self.lifecycle().game()
    }

    fn phase(&self) -> RunPhase {
        self.lifecycle().phase()
    }
}

type TerminalCallback = Box<dyn FnMut(Outcome)>;

/// Drives one engine: input buffering, clocking and terminal delivery
pub struct Runner<E: Engine> {
    engine: E,
    input: E::Input,
    accumulator: f32,
    on_terminal: Option<TerminalCallback>,
}

impl<E: Engine> Runner<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            input: E::Input::default(),
            accumulator: 0.0,
            on_terminal: None,
        }
    }

    /// Register the terminal callback (fired once per run with the final score)
    pub fn on_terminal(mut self, callback: impl FnMut(Outcome) + 'static) -> Self {
        self.on_terminal = Some(Box::new(callback));
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Renderable state of the driven engine
    pub fn state(&self) -> &E::State {
        self.engine.state()
    }

    /// Pending input, written by event handlers between ticks
    pub fn input_mut(&mut self) -> &mut E::Input {
        &mut self.input
    }

    /// Restart the run, dropping buffered input and partial time
    pub fn reset(&mut self) {
        self.engine.reset();
        self.input = E::Input::default();
        self.accumulator = 0.0;
    }

    /// Run exactly one tick with the buffered input
    pub fn step(&mut self) {
        self.engine.tick(&self.input);
        self.input.clear_one_shots();

        if let Some(outcome) = self.engine.take_outcome() {
            if let Some(callback) = self.on_terminal.as_mut() {
                callback(outcome);
            }
        }
    }

    /// Advance by one rendered frame of `dt` seconds; returns ticks run
    pub fn frame(&mut self, dt: f32) -> u32 {
        match E::CLOCK {
            Clock::PerFrame => {
                self.step();
                1
            }
            Clock::Fixed(step) => {
                self.accumulator += dt.clamp(0.0, MAX_FRAME_DELTA);

                let mut substeps = 0;
                while self.accumulator >= step && substeps < MAX_SUBSTEPS {
                    self.step();
                    self.accumulator -= step;
                    substeps += 1;
                }
                substeps
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::consts::SNAKE_STEP_SECS;
    use crate::sim::collision::Direction;
    use crate::sim::snake::{SnakeEngine, SnakeInput};
    use crate::sim::state::OutcomeKind;

    #[test]
    fn test_fixed_clock_is_frame_rate_independent() {
        let mut runner = Runner::new(SnakeEngine::new(1));
        let head = runner.state().head();

        // 0.1 s is below one step
        assert_eq!(runner.frame(0.1), 0);
        assert_eq!(runner.state().head(), head);

        // Crossing 0.15 s runs exactly one step
        assert_eq!(runner.frame(0.06), 1);
        assert_eq!(runner.state().head().y, head.y - 1);

        // Many tiny frames add up to the same step count
        let mut ticks = 0;
        for _ in 0..150 {
            ticks += runner.frame(SNAKE_STEP_SECS / 10.0);
        }
        assert!((14..=15).contains(&ticks));
    }

    #[test]
    fn test_terminal_callback_fires_once() {
        let seen: Rc<RefCell<Vec<Outcome>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut runner =
            Runner::new(SnakeEngine::new(3)).on_terminal(move |o| sink.borrow_mut().push(o));

        // Heading up from y=10 hits the wall after 11 steps
        for _ in 0..40 {
            runner.step();
        }
        let outcomes = seen.borrow();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].kind, OutcomeKind::Lost);
        assert_eq!(outcomes[0].game, GameId::Snake);
    }

    #[test]
    fn test_one_shot_input_cleared_after_step() {
        let mut runner = Runner::new(SnakeEngine::new(5));
        *runner.input_mut() = SnakeInput {
            turn: Some(Direction::Left),
            pause: false,
        };
        runner.step();
        assert!(runner.input_mut().turn.is_none());
        assert_eq!(runner.state().heading, Direction::Left);
    }

    #[test]
    fn test_reset_rearms_callback() {
        let count = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&count);
        let mut runner =
            Runner::new(SnakeEngine::new(9)).on_terminal(move |_| *sink.borrow_mut() += 1);

        for _ in 0..20 {
            runner.step();
        }
        runner.reset();
        assert_eq!(runner.engine().phase(), RunPhase::Running);
        for _ in 0..20 {
            runner.step();
        }
        assert_eq!(*count.borrow(), 2);
    }
}
