//! Grid snake
//!
//! Advances on a fixed logical step (see [`crate::consts::SNAKE_STEP_SECS`]);
//! the [`Runner`](super::Runner) accumulates frame time into steps.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Cell, Direction};
use super::state::{GameId, Lifecycle, Outcome, OutcomeKind};
use super::tick::{Clock, Engine, TickInput};
use crate::consts::SNAKE_STEP_SECS;

/// Default grid edge length
pub const GRID_SIZE: usize = 20;
/// Points per food eaten
pub const FOOD_POINTS: u64 = 10;
/// Random draws before falling back to scanning the free cells
const FOOD_SAMPLE_ATTEMPTS: u32 = 64;

/// Snake rules and starting layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeConfig {
    pub width: usize,
    pub height: usize,
    pub food_points: u64,
    /// Starting body, head first
    pub start_body: Vec<Cell>,
    pub start_heading: Direction,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            width: GRID_SIZE,
            height: GRID_SIZE,
            food_points: FOOD_POINTS,
            start_body: vec![Cell::new(10, 10), Cell::new(10, 11), Cell::new(10, 12)],
            start_heading: Direction::Up,
        }
    }
}

/// Input buffered between snake steps
#[derive(Debug, Clone, Default)]
pub struct SnakeInput {
    pub turn: Option<Direction>,
    pub pause: bool,
}

impl TickInput for SnakeInput {
    fn clear_one_shots(&mut self) {
        self.turn = None;
        self.pause = false;
    }
}

/// Renderable snake state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeState {
    /// Body cells, head first
    pub body: VecDeque<Cell>,
    /// Direction travelled on the last step
    pub heading: Direction,
    /// Direction the next step will take
    pub pending: Direction,
    pub food: Cell,
    pub score: u64,
    pub steps: u64,
}

impl SnakeState {
    fn from_config(config: &SnakeConfig) -> Self {
        Self {
            body: config.start_body.iter().copied().collect(),
            heading: config.start_heading,
            pending: config.start_heading,
            food: Cell::new(0, 0),
            score: 0,
            steps: 0,
        }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }
}

pub struct SnakeEngine {
    config: SnakeConfig,
    state: SnakeState,
    rng: Pcg32,
    lifecycle: Lifecycle,
}

impl SnakeEngine {
    pub fn new(seed: u64) -> Self {
        Self::with_config(SnakeConfig::default(), seed)
    }

    pub fn with_config(config: SnakeConfig, seed: u64) -> Self {
        let state = SnakeState::from_config(&config);
        let mut engine = Self {
            config,
            state,
            rng: Pcg32::seed_from_u64(seed),
            lifecycle: Lifecycle::new(GameId::Snake),
        };
        engine.reset();
        engine
    }

    pub fn config(&self) -> &SnakeConfig {
        &self.config
    }

    /// Queue a turn for the next step. The exact reverse of the current
    /// heading is ignored.
    pub fn change_direction(&mut self, dir: Direction) {
        if self.lifecycle.is_terminal() || dir.is_opposite(self.state.heading) {
            return;
        }
        self.state.pending = dir;
    }

    /// Pin the food on a free cell (host scripted layouts). Returns false
    /// for occupied or out-of-bounds cells.
    pub fn place_food(&mut self, cell: Cell) -> bool {
        if !cell.in_bounds(self.config.width, self.config.height) || self.state.occupies(cell) {
            return false;
        }
        self.state.food = cell;
        true
    }

    /// Move the food to a uniformly random free cell. Returns false when the
    /// snake covers the whole grid.
    pub fn respawn_food(&mut self) -> bool {
        let (width, height) = (self.config.width, self.config.height);
        let cells = width * height;
        if self.state.len() >= cells {
            return false;
        }

        for _ in 0..FOOD_SAMPLE_ATTEMPTS {
            let cell = Cell::new(
                self.rng.random_range(0..width) as i32,
                self.rng.random_range(0..height) as i32,
            );
            if !self.state.occupies(cell) {
                self.state.food = cell;
                return true;
            }
        }

        // Crowded board: pick among the free cells directly
        let free: Vec<Cell> = (0..cells)
            .map(|i| {
                let (x, y) = crate::grid_coords(i, width);
                Cell::new(x, y)
            })
            .filter(|c| !self.state.occupies(*c))
            .collect();
        if free.is_empty() {
            return false;
        }
        self.state.food = free[self.rng.random_range(0..free.len())];
        true
    }

    fn step(&mut self) {
        self.state.heading = self.state.pending;
        let next = self.state.head().step(self.state.heading);

        if !next.in_bounds(self.config.width, self.config.height) || self.state.occupies(next) {
            log::debug!("Snake crashed at ({}, {})", next.x, next.y);
            self.lifecycle.finish(OutcomeKind::Lost, self.state.score);
            return;
        }

        self.state.body.push_front(next);
        self.state.steps += 1;

        if next == self.state.food {
            self.state.score += self.config.food_points;
            if !self.respawn_food() {
                // Nowhere left to put food: the snake fills the grid
                self.lifecycle.finish(OutcomeKind::Won, self.state.score);
            }
        } else {
            self.state.body.pop_back();
        }
    }
}

impl Engine for SnakeEngine {
    type Input = SnakeInput;
    type State = SnakeState;

    const CLOCK: Clock = Clock::Fixed(SNAKE_STEP_SECS);

    fn reset(&mut self) {
        self.state = SnakeState::from_config(&self.config);
        self.lifecycle.reset(true);
        self.respawn_food();
    }

    fn tick(&mut self, input: &SnakeInput) {
        if input.pause {
            self.lifecycle.toggle_pause();
        }
        if let Some(dir) = input.turn {
            self.change_direction(dir);
        }
        if !self.lifecycle.is_running() {
            return;
        }
        self.step();
    }

    fn state(&self) -> &SnakeState {
        &self.state
    }

    fn score(&self) -> u64 {
        self.state.score
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn take_outcome(&mut self) -> Option<Outcome> {
        self.lifecycle.take_outcome()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::sim::state::RunPhase;

    fn idle() -> SnakeInput {
        SnakeInput::default()
    }

    fn turn(dir: Direction) -> SnakeInput {
        SnakeInput {
            turn: Some(dir),
            pause: false,
        }
    }

    #[test]
    fn test_three_steps_up() {
        let mut engine = SnakeEngine::new(2024);
        assert!(engine.place_food(Cell::new(0, 0)));

        for _ in 0..3 {
            engine.tick(&idle());
        }
        assert_eq!(engine.state().head(), Cell::new(10, 7));
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.phase(), RunPhase::Running);
        assert_eq!(engine.state().len(), 3);
    }

    #[test]
    fn test_reverse_is_ignored() {
        let mut engine = SnakeEngine::new(7);
        engine.place_food(Cell::new(0, 0));

        engine.tick(&turn(Direction::Down));
        assert_eq!(engine.state().heading, Direction::Up);
        assert_eq!(engine.state().head(), Cell::new(10, 9));
        assert_eq!(engine.phase(), RunPhase::Running);
    }

    #[test]
    fn test_turn_takes_effect_next_step() {
        let mut engine = SnakeEngine::new(7);
        engine.place_food(Cell::new(0, 0));

        engine.change_direction(Direction::Right);
        // Not applied until the step
        assert_eq!(engine.state().heading, Direction::Up);
        engine.tick(&idle());
        assert_eq!(engine.state().head(), Cell::new(11, 10));
    }

    #[test]
    fn test_food_grows_by_one() {
        let mut engine = SnakeEngine::new(1);
        assert!(engine.place_food(Cell::new(10, 9)));

        engine.tick(&idle());
        assert_eq!(engine.state().len(), 4);
        assert_eq!(engine.score(), FOOD_POINTS);
        assert!(!engine.state().occupies(engine.state().food));

        engine.place_food(Cell::new(0, 19));
        engine.tick(&idle());
        assert_eq!(engine.state().len(), 4);
    }

    #[test]
    fn test_place_food_rejects_body() {
        let mut engine = SnakeEngine::new(1);
        assert!(!engine.place_food(Cell::new(10, 11)));
        assert!(!engine.place_food(Cell::new(-1, 0)));
        assert!(!engine.place_food(Cell::new(20, 0)));
    }

    #[test]
    fn test_wall_collision_freezes_state() {
        let mut engine = SnakeEngine::new(3);
        engine.place_food(Cell::new(0, 19));

        for _ in 0..11 {
            engine.tick(&idle());
        }
        assert_eq!(engine.phase(), RunPhase::Lost);
        let frozen = engine.state().body.clone();

        for _ in 0..5 {
            engine.tick(&turn(Direction::Left));
        }
        assert_eq!(engine.state().body, frozen);
        assert_eq!(engine.take_outcome().map(|o| o.score), Some(0));
        assert!(engine.take_outcome().is_none());
    }

    #[test]
    fn test_self_collision() {
        let config = SnakeConfig {
            start_body: vec![
                Cell::new(5, 5),
                Cell::new(6, 5),
                Cell::new(6, 4),
                Cell::new(5, 4),
                Cell::new(4, 4),
            ],
            start_heading: Direction::Left,
            ..Default::default()
        };
        let mut engine = SnakeEngine::with_config(config, 9);
        engine.place_food(Cell::new(0, 0));

        engine.tick(&turn(Direction::Up));
        assert_eq!(engine.phase(), RunPhase::Lost);
    }

    #[test]
    fn test_food_never_on_snake_near_full_board() {
        let body = vec![
            Cell::new(0, 0),
            Cell::new(1, 0),
            Cell::new(2, 0),
            Cell::new(3, 0),
            Cell::new(3, 1),
            Cell::new(2, 1),
            Cell::new(1, 1),
            Cell::new(0, 1),
            Cell::new(0, 2),
            Cell::new(1, 2),
            Cell::new(2, 2),
            Cell::new(3, 2),
            Cell::new(3, 3),
            Cell::new(2, 3),
        ];
        let config = SnakeConfig {
            width: 4,
            height: 4,
            start_body: body,
            start_heading: Direction::Up,
            ..Default::default()
        };
        let mut engine = SnakeEngine::with_config(config, 77);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            assert!(engine.respawn_food());
            let food = engine.state().food;
            assert!(!engine.state().occupies(food));
            assert!(food.in_bounds(4, 4));
            seen.insert(food);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_filling_grid_wins() {
        let config = SnakeConfig {
            width: 2,
            height: 2,
            start_body: vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1)],
            start_heading: Direction::Left,
            ..Default::default()
        };
        let mut engine = SnakeEngine::with_config(config, 4);
        assert_eq!(engine.state().food, Cell::new(0, 1));

        engine.tick(&turn(Direction::Down));
        assert_eq!(engine.phase(), RunPhase::Won);
        assert_eq!(engine.state().len(), 4);
        assert_eq!(engine.score(), FOOD_POINTS);
    }

    #[test]
    fn test_pause_keeps_state() {
        let mut engine = SnakeEngine::new(12);
        engine.place_food(Cell::new(0, 0));
        engine.tick(&SnakeInput {
            turn: None,
            pause: true,
        });
        assert_eq!(engine.phase(), RunPhase::Paused);
        for _ in 0..5 {
            engine.tick(&idle());
        }
        assert_eq!(engine.state().head(), Cell::new(10, 10));

        engine.tick(&SnakeInput {
            turn: None,
            pause: true,
        });
        assert_eq!(engine.state().head(), Cell::new(10, 9));
    }

    proptest! {
        #[test]
        fn prop_head_moves_one_cell(
            turns in prop::collection::vec(prop::option::of(prop::sample::select(Direction::ALL.to_vec())), 1..120),
            seed in any::<u64>(),
        ) {
            let mut engine = SnakeEngine::new(seed);
            for t in turns {
                if engine.phase() != RunPhase::Running {
                    break;
                }
                let before_head = engine.state().head();
                let before_heading = engine.state().heading;
                let before_len = engine.state().len();
                let before_score = engine.score();

                engine.tick(&SnakeInput { turn: t, pause: false });

                if engine.phase() == RunPhase::Lost {
                    prop_assert_eq!(engine.state().len(), before_len);
                    break;
                }
                let state = engine.state();
                prop_assert!(!state.heading.is_opposite(before_heading));
                prop_assert_eq!(state.head(), before_head.step(state.heading));
                prop_assert_eq!(state.head().manhattan(before_head), 1);
                if engine.score() > before_score {
                    prop_assert_eq!(state.len(), before_len + 1);
                } else {
                    prop_assert_eq!(state.len(), before_len);
                }
                prop_assert!(!state.occupies(state.food) || engine.phase() == RunPhase::Won);
            }
        }
    }
}
