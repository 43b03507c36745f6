//! Side-scrolling tile platformer
//!
//! Axis-separated movement against a [`TileMap`]: horizontal first, then
//! vertical with landing and head-bump snaps. Patrol enemies walk until they
//! meet a wall and can be stomped from above.

pub mod level;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::{GameId, Lifecycle, Outcome, OutcomeKind};
use super::tick::{Clock, Engine, TickInput};

pub use level::{ENEMY_SPAWN_X, GOAL_COLUMN, TILE_SIZE, TileKind, TileMap, builtin_level};

/// Physics (units per tick)
pub const GRAVITY: f32 = 0.5;
pub const JUMP_VELOCITY: f32 = -11.0;
pub const RUN_SPEED: f32 = 4.0;
/// Kept below one tile so a fall never skips a row
pub const MAX_FALL_SPEED: f32 = 31.0;

pub const PLAYER_SIZE: Vec2 = Vec2::new(24.0, 28.0);
pub const PLAYER_START: Vec2 = Vec2::new(50.0, 200.0);
pub const ENEMY_SIZE: Vec2 = Vec2::new(30.0, 30.0);
pub const ENEMY_SPEED: f32 = 1.0;
pub const ENEMY_FALL_SPEED: f32 = 2.0;
/// How far below its feet an enemy looks for ground
pub const ENEMY_GROUND_PROBE: f32 = 10.0;

/// Max overlap of the player's feet into an enemy that still counts as a stomp
pub const STOMP_TOLERANCE: f32 = 15.0;
pub const STOMP_BOUNCE: f32 = -5.0;

pub const COIN_POINTS: u64 = 10;
pub const STOMP_POINTS: u64 = 100;
pub const WIN_BONUS: u64 = 1000;
pub const PIT_DEATH_Y: f32 = 600.0;

/// Camera keeps the player this far from the left edge
pub const CAMERA_LEAD: f32 = 200.0;
/// Fraction of the remaining camera distance covered per tick
pub const CAMERA_SMOOTHING: f32 = 0.1;

/// Gap kept between a resting body and the tile below it
const SNAP_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformerConfig {
    pub gravity: f32,
    pub jump_velocity: f32,
    pub run_speed: f32,
    pub max_fall_speed: f32,
    pub player_size: Vec2,
    pub player_start: Vec2,
    pub enemy_size: Vec2,
    pub enemy_speed: f32,
    /// Enemy spawn points (top-left)
    pub enemy_spawns: Vec<Vec2>,
    pub stomp_tolerance: f32,
    pub stomp_bounce: f32,
    pub coin_points: u64,
    pub stomp_points: u64,
    pub win_bonus: u64,
    pub pit_death_y: f32,
    /// Passing this x ends the run in a win
    pub goal_x: f32,
    pub camera_lead: f32,
    pub camera_smoothing: f32,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            run_speed: RUN_SPEED,
            max_fall_speed: MAX_FALL_SPEED,
            player_size: PLAYER_SIZE,
            player_start: PLAYER_START,
            enemy_size: ENEMY_SIZE,
            enemy_speed: ENEMY_SPEED,
            enemy_spawns: ENEMY_SPAWN_X.iter().map(|&x| Vec2::new(x, 0.0)).collect(),
            stomp_tolerance: STOMP_TOLERANCE,
            stomp_bounce: STOMP_BOUNCE,
            coin_points: COIN_POINTS,
            stomp_points: STOMP_POINTS,
            win_bonus: WIN_BONUS,
            pit_death_y: PIT_DEATH_Y,
            goal_x: GOAL_COLUMN as f32 * TILE_SIZE,
            camera_lead: CAMERA_LEAD,
            camera_smoothing: CAMERA_SMOOTHING,
        }
    }
}

/// Held directions plus one-shot jump and pause
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub pause: bool,
}

impl TickInput for PlatformerInput {
    fn clear_one_shots(&mut self) {
        self.jump = false;
        self.pause = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Aabb,
    pub velocity: Vec2,
    pub grounded: bool,
    pub facing_right: bool,
}

impl Player {
    fn spawn(config: &PlatformerConfig) -> Self {
        Self {
            body: Aabb::from_pos_size(config.player_start, config.player_size),
            velocity: Vec2::ZERO,
            grounded: false,
            facing_right: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub body: Aabb,
    /// Horizontal patrol velocity
    pub vx: f32,
    /// Stomped enemies stay in the list but no longer move or collide
    pub dead: bool,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, size: Vec2, vx: f32) -> Self {
        Self {
            id,
            body: Aabb::from_pos_size(pos, size),
            vx,
            dead: false,
        }
    }

    /// Patrol step: reverse at walls and level edges, fall until ground is
    /// within reach, then rest on it
    fn patrol(&mut self, map: &TileMap) {
        let ahead = self.body.at(self.body.x + self.vx, self.body.y);
        if ahead.x < 0.0 || ahead.right() > map.pixel_width() || map.overlaps_solid(&ahead) {
            self.vx = -self.vx;
        } else {
            self.body = ahead;
        }

        match map.ground_below(&self.body, ENEMY_GROUND_PROBE) {
            Some(top) => self.body.y = top - self.body.height - SNAP_EPSILON,
            None => self.body.y += ENEMY_FALL_SPEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformerState {
    pub map: TileMap,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Horizontal scroll offset, never negative
    pub camera_x: f32,
    pub score: u64,
    pub frames: u64,
}

impl PlatformerState {
    fn new(config: &PlatformerConfig, map: TileMap) -> Self {
        let enemies = config
            .enemy_spawns
            .iter()
            .zip(1..)
            .map(|(&pos, id)| Enemy::new(id, pos, config.enemy_size, -config.enemy_speed))
            .collect();

        Self {
            map,
            player: Player::spawn(config),
            enemies,
            camera_x: 0.0,
            score: 0,
            frames: 0,
        }
    }

    pub fn enemies_alive(&self) -> usize {
        self.enemies.iter().filter(|e| !e.dead).count()
    }
}

pub struct PlatformerEngine {
    config: PlatformerConfig,
    /// Pristine level, restored on reset
    level: TileMap,
    state: PlatformerState,
    lifecycle: Lifecycle,
}

impl PlatformerEngine {
    /// Built-in level with default tuning. The level is fixed, so the seed
    /// only exists to match the other engines' constructors.
    pub fn new(_seed: u64) -> Self {
        Self::with_level(PlatformerConfig::default(), builtin_level())
    }

    pub fn with_level(config: PlatformerConfig, level: TileMap) -> Self {
        let state = PlatformerState::new(&config, level.clone());
        let mut engine = Self {
            config,
            level,
            state,
            lifecycle: Lifecycle::new(GameId::Platformer),
        };
        engine.reset();
        engine
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    fn move_horizontal(&mut self, input: &PlatformerInput) {
        let player = &mut self.state.player;
        // Left wins when both are held
        player.velocity.x = match (input.left, input.right) {
            (true, _) => {
                player.facing_right = false;
                -self.config.run_speed
            }
            (false, true) => {
                player.facing_right = true;
                self.config.run_speed
            }
            (false, false) => 0.0,
        };
        if player.velocity.x == 0.0 {
            return;
        }

        let moved = player.body.at(player.body.x + player.velocity.x, player.body.y);
        let in_level = moved.x >= 0.0 && moved.right() <= self.state.map.pixel_width();
        if in_level && !self.state.map.overlaps_solid(&moved) {
            player.body = moved;
        }
    }

    fn move_vertical(&mut self) {
        let tile = self.state.map.tile_size();
        let player = &mut self.state.player;
        player.velocity.y = (player.velocity.y + self.config.gravity).min(self.config.max_fall_speed);

        let moved = player.body.at(player.body.x, player.body.y + player.velocity.y);
        if !self.state.map.overlaps_solid(&moved) {
            player.body = moved;
            player.grounded = false;
        } else if player.velocity.y > 0.0 {
            // Land on top of the row the feet entered
            let row = (moved.bottom() / tile).floor();
            player.body.y = row * tile - player.body.height - SNAP_EPSILON;
            player.velocity.y = 0.0;
            player.grounded = true;
        } else {
            // Head bump: stop just under the row the head entered
            let row = (moved.y / tile).floor();
            player.body.y = (row + 1.0) * tile;
            player.velocity.y = 0.0;
        }
    }

    /// Enemy patrol and player contact. Returns false when the player died.
    fn update_enemies(&mut self) -> bool {
        let state = &mut self.state;
        for enemy in state.enemies.iter_mut().filter(|e| !e.dead) {
            enemy.patrol(&state.map);

            if !state.player.body.intersects(&enemy.body) {
                continue;
            }
            let sink = state.player.body.bottom() - enemy.body.y;
            if state.player.velocity.y > 0.0 && sink > 0.0 && sink < self.config.stomp_tolerance {
                enemy.dead = true;
                state.player.velocity.y = self.config.stomp_bounce;
                state.score += self.config.stomp_points;
                log::debug!("Enemy {} stomped", enemy.id);
            } else {
                log::debug!("Player hit by enemy {}", enemy.id);
                return false;
            }
        }
        true
    }

    fn update_camera(&mut self) {
        let target = (self.state.player.body.x - self.config.camera_lead).max(0.0);
        let camera = &mut self.state.camera_x;
        *camera += (target - *camera) * self.config.camera_smoothing;
        *camera = camera.max(0.0);
    }

    fn advance(&mut self, input: &PlatformerInput) {
        self.state.frames += 1;

        if input.jump && self.state.player.grounded {
            self.state.player.velocity.y = self.config.jump_velocity;
            self.state.player.grounded = false;
        }

        self.move_horizontal(input);
        self.move_vertical();

        let coins = self.state.map.collect_coins(&self.state.player.body);
        self.state.score += u64::from(coins) * self.config.coin_points;

        if self.state.map.overlaps(&self.state.player.body, TileKind::Hazard) {
            self.lifecycle.finish(OutcomeKind::Lost, self.state.score);
            return;
        }

        if !self.update_enemies() {
            self.lifecycle.finish(OutcomeKind::Lost, self.state.score);
            return;
        }

        if self.state.player.body.y > self.config.pit_death_y {
            self.lifecycle.finish(OutcomeKind::Lost, self.state.score);
            return;
        }

        if self.state.player.body.x > self.config.goal_x {
            self.state.score += self.config.win_bonus;
            self.lifecycle.finish(OutcomeKind::Won, self.state.score);
            return;
        }

        self.update_camera();
    }
}

impl Engine for PlatformerEngine {
    type Input = PlatformerInput;
    type State = PlatformerState;

    const CLOCK: Clock = Clock::PerFrame;

    fn reset(&mut self) {
        self.state = PlatformerState::new(&self.config, self.level.clone());
        self.lifecycle.reset(true);
    }

    fn tick(&mut self, input: &PlatformerInput) {
        if input.pause {
            self.lifecycle.toggle_pause();
        }
        if !self.lifecycle.is_running() {
            return;
        }
        self.advance(input);
    }

    fn state(&self) -> &PlatformerState {
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
