//! Simulation module
//!
//! All gameplay logic lives here. Engines are pure state machines:
//! - One owning engine value per running game, no globals
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod platformer;
pub mod puzzle;
pub mod scroller;
pub mod snake;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Cell, Direction, tiles_spanned};
pub use platformer::{PlatformerEngine, PlatformerInput, PlatformerState, TileKind, TileMap};
pub use puzzle::{Board, PuzzleEngine, PuzzleInput, Tile};
pub use scroller::{Obstacle, ScrollerEngine, ScrollerInput, ScrollerState};
pub use snake::{SnakeEngine, SnakeInput, SnakeState};
pub use state::{GameId, Lifecycle, Outcome, OutcomeKind, RunPhase};
pub use tick::{Clock, Engine, Runner, TickInput};
