//! 2048-style merge puzzle
//!
//! The board is a sparse set of tiles with stable ids rather than a dense
//! grid, so a presentation layer can diff two snapshots to animate slides
//! and merges. The simulation itself carries no animation flags.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Cell, Direction};
use super::state::{GameId, Lifecycle, Outcome, OutcomeKind};
use super::tick::{Clock, Engine, TickInput};

/// Board edge length
pub const BOARD_SIZE: usize = 4;
/// Reaching this tile wins the run
pub const WIN_VALUE: u32 = 2048;
/// Probability a spawned tile is a 4 instead of a 2
pub const FOUR_CHANCE: f64 = 0.1;
/// Tiles placed by `reset`
pub const START_TILES: usize = 2;

/// A numbered tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub cell: Cell,
    pub value: u32,
}

/// Result of sliding the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slide {
    /// Any tile changed cell or value
    pub moved: bool,
    /// Sum of the values created by merges
    pub gained: u64,
}

/// 4x4 board, tiles kept sorted by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
    next_id: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            tiles: Vec::with_capacity(BOARD_SIZE * BOARD_SIZE),
            next_id: 1,
        }
    }

    /// Build from dense rows (`rows[y][x]`, 0 = empty). Ids follow row-major order.
    pub fn from_rows(rows: [[u32; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        let mut board = Self::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value != 0 {
                    board.insert(Cell::new(x as i32, y as i32), value);
                }
            }
        }
        board
    }

    /// Dense view (`rows[y][x]`, 0 = empty)
    pub fn to_rows(&self) -> [[u32; BOARD_SIZE]; BOARD_SIZE] {
        let mut rows = [[0; BOARD_SIZE]; BOARD_SIZE];
        for tile in &self.tiles {
            rows[tile.cell.y as usize][tile.cell.x as usize] = tile.value;
        }
        rows
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_at(&self, cell: Cell) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.cell == cell)
    }

    /// Place a tile on an empty in-bounds cell, returning its id
    pub fn insert(&mut self, cell: Cell, value: u32) -> Option<u32> {
        if !cell.in_bounds(BOARD_SIZE, BOARD_SIZE) || self.tile_at(cell).is_some() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.tiles.push(Tile { id, cell, value });
        Some(id)
    }

    /// Empty cells in row-major order
    pub fn empty_cells(&self) -> Vec<Cell> {
        let mut occupied = [false; BOARD_SIZE * BOARD_SIZE];
        for tile in &self.tiles {
            occupied[tile.cell.y as usize * BOARD_SIZE + tile.cell.x as usize] = true;
        }
        occupied
            .iter()
            .enumerate()
            .filter(|(_, taken)| !**taken)
            .map(|(i, _)| {
                let (x, y) = crate::grid_coords(i, BOARD_SIZE);
                Cell::new(x, y)
            })
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() >= BOARD_SIZE * BOARD_SIZE
    }

    /// Any two orthogonally adjacent tiles share a value
    pub fn has_adjacent_pair(&self) -> bool {
        let rows = self.to_rows();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let v = rows[y][x];
                if v == 0 {
                    continue;
                }
                if x + 1 < BOARD_SIZE && rows[y][x + 1] == v {
                    return true;
                }
                if y + 1 < BOARD_SIZE && rows[y + 1][x] == v {
                    return true;
                }
            }
        }
        false
    }

    pub fn contains_value(&self, value: u32) -> bool {
        self.tiles.iter().any(|t| t.value == value)
    }

    pub fn max_value(&self) -> u32 {
        self.tiles.iter().map(|t| t.value).max().unwrap_or(0)
    }

    /// Slide every line toward `dir`, merging equal neighbours once.
    ///
    /// The leading tile of a merged pair keeps its id; the trailing one is
    /// removed. A merged tile never merges again in the same slide, so
    /// `[2, 2, 2, 2]` becomes `[4, 4]`.
    pub fn slide(&mut self, dir: Direction) -> Slide {
        let mut next = Vec::with_capacity(self.tiles.len());
        let mut gained = 0u64;

        for line in 0..BOARD_SIZE {
            let cells = line_cells(dir, line);
            let packed: Vec<Tile> = cells
                .iter()
                .filter_map(|c| self.tile_at(*c).copied())
                .collect();

            let mut slot = 0;
            let mut i = 0;
            while i < packed.len() {
                let mut tile = packed[i];
                if i + 1 < packed.len() && packed[i + 1].value == tile.value {
                    tile.value *= 2;
                    gained += tile.value as u64;
                    i += 2;
                } else {
                    i += 1;
                }
                tile.cell = cells[slot];
                slot += 1;
                next.push(tile);
            }
        }

        next.sort_by_key(|t| t.id);
        if next == self.tiles {
            return Slide::default();
        }
        self.tiles = next;
        Slide {
            moved: true,
            gained,
        }
    }

    /// Spawn a 2 (or rarely a 4) on a uniformly random empty cell
    pub fn spawn_random(&mut self, rng: &mut impl Rng) -> Option<Tile> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let cell = empty[rng.random_range(0..empty.len())];
        let value = if rng.random_bool(FOUR_CHANCE) { 4 } else { 2 };
        let id = self.insert(cell, value)?;
        Some(Tile { id, cell, value })
    }
}

/// Cells of one row/column ordered from the edge tiles travel toward
fn line_cells(dir: Direction, line: usize) -> [Cell; BOARD_SIZE] {
    let i = line as i32;
    let last = BOARD_SIZE as i32 - 1;
    std::array::from_fn(|k| {
        let k = k as i32;
        match dir {
            Direction::Left => Cell::new(k, i),
            Direction::Right => Cell::new(last - k, i),
            Direction::Up => Cell::new(i, k),
            Direction::Down => Cell::new(i, last - k),
        }
    })
}

/// Input buffered between puzzle ticks
#[derive(Debug, Clone, Default)]
pub struct PuzzleInput {
    /// Swipe or arrow key
    pub direction: Option<Direction>,
    pub pause: bool,
}

impl TickInput for PuzzleInput {
    fn clear_one_shots(&mut self) {
        self.direction = None;
        self.pause = false;
    }
}

/// Renderable puzzle state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PuzzleState {
    pub board: Board,
    pub score: u64,
    /// Effective moves this run
    pub moves: u32,
}

pub struct PuzzleEngine {
    state: PuzzleState,
    rng: Pcg32,
    lifecycle: Lifecycle,
}

impl PuzzleEngine {
    pub fn new(seed: u64) -> Self {
        let mut engine = Self {
            state: PuzzleState::default(),
            rng: Pcg32::seed_from_u64(seed),
            lifecycle: Lifecycle::new(GameId::Puzzle),
        };
        engine.reset();
        engine
    }

    /// Running engine on a prepared board (score starts at zero)
    pub fn with_board(board: Board, seed: u64) -> Self {
        let mut engine = Self::new(seed);
        engine.state.board = board;
        engine
    }

    /// Slide the board. Returns whether the move was effective.
    ///
    /// Only an effective move spawns a tile, scores and checks for the end
    /// of the run.
    pub fn apply_move(&mut self, dir: Direction) -> bool {
        if !self.lifecycle.is_running() {
            return false;
        }

        let slide = self.state.board.slide(dir);
        if !slide.moved {
            return false;
        }

        self.state.score += slide.gained;
        self.state.moves += 1;
        if let Some(tile) = self.state.board.spawn_random(&mut self.rng) {
            log::debug!("Spawned {} at ({}, {})", tile.value, tile.cell.x, tile.cell.y);
        }

        let board = &self.state.board;
        if board.contains_value(WIN_VALUE) {
            self.lifecycle.finish(OutcomeKind::Won, self.state.score);
        } else if board.is_full() && !board.has_adjacent_pair() {
            self.lifecycle.finish(OutcomeKind::Lost, self.state.score);
        }
        true
    }
}

impl Engine for PuzzleEngine {
    type Input = PuzzleInput;
    type State = PuzzleState;

    const CLOCK: Clock = Clock::PerFrame;

    fn reset(&mut self) {
        self.state = PuzzleState::default();
        for _ in 0..START_TILES {
            self.state.board.spawn_random(&mut self.rng);
        }
        self.lifecycle.reset(true);
    }

    fn tick(&mut self, input: &PuzzleInput) {
        if input.pause {
            self.lifecycle.toggle_pause();
        }
        if let Some(dir) = input.direction {
            self.apply_move(dir);
        }
    }

    fn state(&self) -> &PuzzleState {
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
