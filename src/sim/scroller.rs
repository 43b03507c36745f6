//! Flappy-style side-scroller
//!
//! A ship holds a fixed x position and only moves vertically under gravity
//! and jump impulses. Obstacles (a top and a bottom laser segment around a
//! gap) scroll in from the right at constant speed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::{GameId, Lifecycle, Outcome, OutcomeKind};
use super::tick::{Clock, Engine, TickInput};

/// Play area
pub const PLAY_WIDTH: f32 = 300.0;
pub const PLAY_HEIGHT: f32 = 400.0;

/// Ship defaults
pub const SHIP_SIZE: f32 = 35.0;
pub const SHIP_X: f32 = 35.0;
/// Hitbox scale relative to the sprite
pub const SHIP_HITBOX_SCALE: f32 = 0.6;

/// Physics (units per tick)
pub const GRAVITY: f32 = 0.6;
pub const JUMP_VELOCITY: f32 = -10.0;
pub const SCROLL_SPEED: f32 = 2.0;

/// Obstacle defaults
pub const OBSTACLE_WIDTH: f32 = 50.0;
pub const GAP_HEIGHT: f32 = 180.0;
/// Distance the newest obstacle travels before the next one spawns
pub const SPAWN_SPACING: f32 = 180.0;
/// Smallest solid segment above or below a gap
pub const MIN_SEGMENT: f32 = 20.0;

/// Scroller tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollerConfig {
    pub play_width: f32,
    pub play_height: f32,
    pub ship_x: f32,
    pub ship_size: f32,
    pub hitbox_scale: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub scroll_speed: f32,
    pub obstacle_width: f32,
    pub gap_height: f32,
    pub spawn_spacing: f32,
    /// Gap center band as fractions of the play height
    pub gap_band: (f32, f32),
    pub min_segment: f32,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            play_width: PLAY_WIDTH,
            play_height: PLAY_HEIGHT,
            ship_x: SHIP_X,
            ship_size: SHIP_SIZE,
            hitbox_scale: SHIP_HITBOX_SCALE,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            scroll_speed: SCROLL_SPEED,
            obstacle_width: OBSTACLE_WIDTH,
            gap_height: GAP_HEIGHT,
            spawn_spacing: SPAWN_SPACING,
            gap_band: (0.2, 0.8),
            min_segment: MIN_SEGMENT,
        }
    }
}

impl ScrollerConfig {
    /// Allowed gap-center range: the configured band, narrowed so both solid
    /// segments keep at least `min_segment` height
    pub fn gap_center_range(&self) -> (f32, f32) {
        let half = self.gap_height / 2.0;
        let lo = (self.play_height * self.gap_band.0).max(half + self.min_segment);
        let hi = (self.play_height * self.gap_band.1).min(self.play_height - half - self.min_segment);
        if lo > hi {
            // Band too narrow for the gap: center it
            let mid = self.play_height / 2.0;
            (mid, mid)
        } else {
            (lo, hi)
        }
    }
}

/// A pair of laser segments around a gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub gap_center: f32,
    /// Ship already scored this obstacle
    pub passed: bool,
}

impl Obstacle {
    pub fn right(&self, config: &ScrollerConfig) -> f32 {
        self.x + config.obstacle_width
    }

    /// Solid segment above the gap
    pub fn top_segment(&self, config: &ScrollerConfig) -> Aabb {
        let height = self.gap_center - config.gap_height / 2.0;
        Aabb::new(self.x, 0.0, config.obstacle_width, height)
    }

    /// Solid segment below the gap
    pub fn bottom_segment(&self, config: &ScrollerConfig) -> Aabb {
        let top = self.gap_center + config.gap_height / 2.0;
        Aabb::new(self.x, top, config.obstacle_width, config.play_height - top)
    }

    /// Ship hitbox overlaps a solid segment
    pub fn hits(&self, hitbox: &Aabb, config: &ScrollerConfig) -> bool {
        hitbox.intersects(&self.top_segment(config)) || hitbox.intersects(&self.bottom_segment(config))
    }
}

/// Input buffered between frames
#[derive(Debug, Clone, Default)]
pub struct ScrollerInput {
    pub jump: bool,
    pub pause: bool,
}

impl TickInput for ScrollerInput {
    fn clear_one_shots(&mut self) {
        self.jump = false;
        self.pause = false;
    }
}

/// Renderable scroller state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollerState {
    /// Ship top-left y
    pub ship_y: f32,
    pub ship_velocity: f32,
    /// Sorted by id (spawn order, left to right)
    pub obstacles: Vec<Obstacle>,
    pub score: u64,
    pub frames: u64,
    next_id: u32,
}

impl ScrollerState {
    fn new(config: &ScrollerConfig) -> Self {
        Self {
            ship_y: config.play_height / 2.0,
            ship_velocity: 0.0,
            obstacles: Vec::new(),
            score: 0,
            frames: 0,
            next_id: 1,
        }
    }

    /// Ship sprite box
    pub fn ship_box(&self, config: &ScrollerConfig) -> Aabb {
        Aabb::from_pos_size(
            Vec2::new(config.ship_x, self.ship_y),
            Vec2::splat(config.ship_size),
        )
    }

    /// Ship collision box
    pub fn ship_hitbox(&self, config: &ScrollerConfig) -> Aabb {
        self.ship_box(config).shrunk(config.hitbox_scale)
    }
}

pub struct ScrollerEngine {
    config: ScrollerConfig,
    state: ScrollerState,
    rng: Pcg32,
    lifecycle: Lifecycle,
}

impl ScrollerEngine {
    pub fn new(seed: u64) -> Self {
        Self::with_config(ScrollerConfig::default(), seed)
    }

    pub fn with_config(config: ScrollerConfig, seed: u64) -> Self {
        let state = ScrollerState::new(&config);
        let mut engine = Self {
            config,
            state,
            rng: Pcg32::seed_from_u64(seed),
            lifecycle: Lifecycle::new(GameId::Scroller),
        };
        engine.reset();
        engine
    }

    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    /// Jump impulse. The first jump of a run starts it and spawns the first
    /// obstacle; jumps while paused or after the run ended are ignored.
    pub fn jump(&mut self) {
        if self.lifecycle.start() {
            self.state.obstacles.clear();
            self.spawn_obstacle();
        }
        if self.lifecycle.is_running() {
            self.state.ship_velocity = self.config.jump_velocity;
        }
    }

    /// Insert an obstacle at `x` with a known gap (scripted layouts)
    pub fn push_obstacle(&mut self, x: f32, gap_center: f32) -> u32 {
        let id = self.state.next_id;
        self.state.next_id += 1;
        self.state.obstacles.push(Obstacle {
            id,
            x,
            gap_center,
            passed: false,
        });
        id
    }

    fn spawn_obstacle(&mut self) {
        let (lo, hi) = self.config.gap_center_range();
        let gap_center = if hi > lo {
            self.rng.random_range(lo..=hi)
        } else {
            lo
        };
        let id = self.push_obstacle(self.config.play_width, gap_center);
        log::debug!("Obstacle {} spawned, gap at {:.1}", id, gap_center);
    }

    fn needs_spawn(&self) -> bool {
        match self.state.obstacles.last() {
            None => true,
            Some(last) => self.config.play_width - last.x >= self.config.spawn_spacing,
        }
    }

    fn advance(&mut self) {
        let config = &self.config;
        let state = &mut self.state;
        state.frames += 1;

        // Ship physics
        state.ship_velocity += config.gravity;
        let ceiling = 0.0;
        let floor = config.play_height - config.ship_size;
        let next_y = state.ship_y + state.ship_velocity;
        state.ship_y = next_y.clamp(ceiling, floor);
        let out_of_bounds = next_y <= ceiling || next_y >= floor;

        // Scroll and cull
        for obstacle in &mut state.obstacles {
            obstacle.x -= config.scroll_speed;
        }
        state
            .obstacles
            .retain(|o| o.x + config.obstacle_width >= 0.0);

        if out_of_bounds {
            self.lifecycle.finish(OutcomeKind::Lost, state.score);
            return;
        }

        // Collisions and scoring
        let hitbox = state.ship_hitbox(config);
        for obstacle in &mut state.obstacles {
            if obstacle.hits(&hitbox, config) {
                log::debug!("Ship hit obstacle {}", obstacle.id);
                self.lifecycle.finish(OutcomeKind::Lost, state.score);
                return;
            }
            if !obstacle.passed && obstacle.right(config) < hitbox.x {
                obstacle.passed = true;
                state.score += 1;
            }
        }

        if self.needs_spawn() {
            self.spawn_obstacle();
        }
    }
}

impl Engine for ScrollerEngine {
    type Input = ScrollerInput;
    type State = ScrollerState;

    const CLOCK: Clock = Clock::PerFrame;

    fn reset(&mut self) {
        self.state = ScrollerState::new(&self.config);
        self.lifecycle.reset(false);
    }

    fn tick(&mut self, input: &ScrollerInput) {
        if input.pause {
            self.lifecycle.toggle_pause();
        }
        if input.jump {
            self.jump();
        }
        if !self.lifecycle.is_running() {
            return;
        }
        self.advance();
    }

    fn state(&self) -> &ScrollerState {
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
