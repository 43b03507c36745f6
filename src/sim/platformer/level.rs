//! Tile map and the built-in level
//!
//! The map is the only mutable part of a level: coins turn into air when
//! collected. Everything outside the grid reads as air.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::sim::collision::{Aabb, tiles_spanned};

/// Tile edge in world units
pub const TILE_SIZE: f32 = 32.0;
/// Built-in level dimensions (tiles)
pub const LEVEL_WIDTH: usize = 200;
pub const LEVEL_HEIGHT: usize = 14;
/// Column the player must pass to finish
pub const GOAL_COLUMN: usize = 190;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Air,
    Solid,
    Coin,
    Hazard,
}

impl TileKind {
    /// Numeric cell code used by level data (0 air, 1 solid, 2 coin, 3 hazard)
    pub fn code(self) -> u8 {
        match self {
            TileKind::Air => 0,
            TileKind::Solid => 1,
            TileKind::Coin => 2,
            TileKind::Hazard => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TileKind::Air),
            1 => Some(TileKind::Solid),
            2 => Some(TileKind::Coin),
            3 => Some(TileKind::Hazard),
            _ => None,
        }
    }

    fn from_glyph(c: char) -> Self {
        match c {
            '#' => TileKind::Solid,
            'o' => TileKind::Coin,
            '^' => TileKind::Hazard,
            _ => TileKind::Air,
        }
    }
}

/// Row-major grid of tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    width: usize,
    height: usize,
    tile_size: f32,
    cells: Vec<TileKind>,
}

impl TileMap {
    /// All-air map
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            cells: vec![TileKind::Air; width * height],
        }
    }

    /// Parse ASCII rows: `#` solid, `o` coin, `^` hazard, anything else air.
    /// Short rows are padded with air.
    pub fn from_ascii(rows: &[&str], tile_size: f32) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut map = Self::new(width, rows.len(), tile_size);
        for (row, line) in rows.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                map.set(col as i32, row as i32, TileKind::from_glyph(c));
            }
        }
        map
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Level extent in world units
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    pub fn get(&self, col: i32, row: i32) -> TileKind {
        crate::grid_index(col, row, self.width, self.height)
            .map(|i| self.cells[i])
            .unwrap_or(TileKind::Air)
    }

    pub fn set(&mut self, col: i32, row: i32, kind: TileKind) -> bool {
        match crate::grid_index(col, row, self.width, self.height) {
            Some(i) => {
                self.cells[i] = kind;
                true
            }
            None => false,
        }
    }

    fn fill_row(&mut self, row: usize, cols: Range<usize>, kind: TileKind) {
        for col in cols {
            self.set(col as i32, row as i32, kind);
        }
    }

    /// Any tile of `kind` under the box
    pub fn overlaps(&self, rect: &Aabb, kind: TileKind) -> bool {
        let (cols, rows) = tiles_spanned(rect, self.tile_size);
        rows.into_iter()
            .any(|row| cols.clone().any(|col| self.get(col, row) == kind))
    }

    pub fn overlaps_solid(&self, rect: &Aabb) -> bool {
        self.overlaps(rect, TileKind::Solid)
    }

    /// Turn every coin under the box into air; returns how many were taken
    pub fn collect_coins(&mut self, rect: &Aabb) -> u32 {
        let (cols, rows) = tiles_spanned(rect, self.tile_size);
        let mut taken = 0;
        for row in rows {
            for col in cols.clone() {
                if self.get(col, row) == TileKind::Coin {
                    self.set(col, row, TileKind::Air);
                    taken += 1;
                }
            }
        }
        taken
    }

    /// Top edge of the first solid row under the box, looking at most
    /// `reach` units below its bottom edge
    pub fn ground_below(&self, rect: &Aabb, reach: f32) -> Option<f32> {
        let (cols, _) = tiles_spanned(rect, self.tile_size);
        let first = (rect.bottom() / self.tile_size).floor() as i32;
        let last = ((rect.bottom() + reach) / self.tile_size).floor() as i32;
        (first..=last)
            .find(|&row| cols.clone().any(|col| self.get(col, row) == TileKind::Solid))
            .map(|row| row as f32 * self.tile_size)
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.cells.iter().filter(|&&c| c == kind).count()
    }
}

/// The built-in 200x14 level: start platforms, a pit, stairs, floating
/// islands, two pipes, a broken-floor gauntlet and the flag base
pub fn builtin_level() -> TileMap {
    let (w, h) = (LEVEL_WIDTH, LEVEL_HEIGHT);
    let mut map = TileMap::new(w, h, TILE_SIZE);

    // Floor
    map.fill_row(h - 1, 0..w, TileKind::Solid);
    map.fill_row(h - 2, 0..w, TileKind::Solid);

    // Start: a platform with coins on top
    map.fill_row(9, 15..20, TileKind::Solid);
    map.fill_row(8, 15..20, TileKind::Coin);

    // Pit with a risky floating coin
    map.fill_row(h - 1, 40..45, TileKind::Air);
    map.fill_row(h - 2, 40..45, TileKind::Air);
    map.set(42, 9, TileKind::Solid);
    map.set(42, 8, TileKind::Coin);

    // Stairs up then down
    for i in 0..5 {
        for step in 0..=i {
            let row = (h - 3 - step) as i32;
            map.set(50 + i as i32, row, TileKind::Solid);
            map.set(60 - i as i32, row, TileKind::Solid);
        }
    }

    // Floating islands
    for col in (70..85).step_by(4) {
        map.set(col, 8, TileKind::Solid);
        map.set(col, 7, TileKind::Coin);
    }

    // Pipes
    let base = (h - 3) as i32;
    for row in [base, base - 1] {
        map.set(105, row, TileKind::Solid);
    }
    for row in [base, base - 1, base - 2] {
        map.set(115, row, TileKind::Solid);
    }

    // Gauntlet: every other floor column missing, platforms above
    for col in (140..160).step_by(2) {
        map.set(col, (h - 1) as i32, TileKind::Air);
        map.set(col, (h - 2) as i32, TileKind::Air);
        map.set(col, 10, TileKind::Solid);
    }

    // Flagpole base
    map.set(GOAL_COLUMN as i32, base, TileKind::Solid);

    map
}

/// Spawn x positions of the built-in patrol enemies
pub const ENEMY_SPAWN_X: [f32; 7] = [400.0, 700.0, 1200.0, 1700.0, 2500.0, 3000.0, 3500.0];
