//! Pocket Arcade - four casual mini-games on one tick loop
//!
//! Core modules:
//! - `sim`: Simulations (2048 puzzle, snake, side-scroller, platformer) and the host loop
//! - `highscores`: Per-game ranked score lists (scoring sink)
//! - `wallet`: Reward currency ledger, clicker and cosmetic shop
//! - `session`: Routes finished runs into the scores, wallet and settings
//! - `settings`: Persistent player preferences
//! - `persistence`: Key-value stores with silent degradation
//! - `platform`: Browser/native platform abstraction
//! - `web`: wasm-bindgen exports that let a page drive the games (wasm32 only)

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod wallet;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::ScoreBoard;
pub use session::Session;
pub use settings::Settings;
pub use sim::GameId;
pub use wallet::{Clicker, RewardRule, Shop, Wallet};

/// Game configuration constants
pub mod consts {
    /// Snake logical step (150 ms, independent of render rate)
    pub const SNAKE_STEP_SECS: f32 = 0.15;
    /// Nominal frame time for frame-driven engines (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum fixed steps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.25;

    /// Entries kept per game in the score lists
    pub const MAX_HIGH_SCORES: usize = 10;
}

/// Row-major index of `(x, y)` in a `width`-wide grid, `None` when outside
#[inline]
pub fn grid_index(x: i32, y: i32, width: usize, height: usize) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= width || y >= height {
        return None;
    }
    Some(y * width + x)
}

/// Inverse of [`grid_index`]
#[inline]
pub fn grid_coords(index: usize, width: usize) -> (i32, i32) {
    ((index % width) as i32, (index / width) as i32)
}
