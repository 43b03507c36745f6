//! Collision primitives shared by the engines
//!
//! Grid games (puzzle, snake) work in integer cells; the continuous games
//! (scroller, platformer) work in axis-aligned boxes over world units.

use std::ops::RangeInclusive;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Cardinal movement direction (screen space: y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step in grid space
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Parse a direction name or a browser arrow-key name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "up" | "arrowup" => Some(Direction::Up),
            "down" | "arrowdown" => Some(Direction::Down),
            "left" | "arrowleft" => Some(Direction::Left),
            "right" | "arrowright" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// An integer grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step in `dir`
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(self, width: usize, height: usize) -> bool {
        crate::grid_index(self.x, self.y, width, height).is_some()
    }

    /// Manhattan distance to another cell
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Axis-aligned bounding box in world units (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Same box moved to a new top-left corner
    pub fn at(&self, x: f32, y: f32) -> Self {
        Self::new(x, y, self.width, self.height)
    }

    /// Box scaled about its center (hitbox shrinking)
    pub fn shrunk(&self, scale: f32) -> Self {
        let w = self.width * scale;
        let h = self.height * scale;
        Self::new(
            self.x + (self.width - w) / 2.0,
            self.y + (self.height - h) / 2.0,
            w,
            h,
        )
    }

    /// Strict overlap test (shared edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Tile columns and rows touched by a box (inclusive of the far edge)
///
/// A box whose right edge lies exactly on a tile boundary still reports the
/// next column; movers keep a small epsilon off tile edges for that reason.
pub fn tiles_spanned(rect: &Aabb, tile_size: f32) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
    let start_col = (rect.x / tile_size).floor() as i32;
    let end_col = (rect.right() / tile_size).floor() as i32;
    let start_row = (rect.y / tile_size).floor() as i32;
    let end_row = (rect.bottom() / tile_size).floor() as i32;
    (start_col..=end_col, start_row..=end_row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposites() {
        for dir in Direction::ALL {
            assert!(dir.is_opposite(dir.opposite()));
            assert!(!dir.is_opposite(dir));
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_direction_names() {
        assert_eq!(Direction::from_name("up"), Some(Direction::Up));
        assert_eq!(Direction::from_name("ArrowLeft"), Some(Direction::Left));
        assert_eq!(Direction::from_name("RIGHT"), Some(Direction::Right));
        assert_eq!(Direction::from_name("sideways"), None);
    }

    #[test]
    fn test_cell_step_and_bounds() {
        let c = Cell::new(0, 0);
        assert_eq!(c.step(Direction::Right), Cell::new(1, 0));
        assert!(!c.step(Direction::Up).in_bounds(20, 20));
        assert_eq!(c.manhattan(Cell::new(2, 3)), 5);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Aabb::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edges are not an overlap
        assert!(!a.intersects(&Aabb::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.intersects(&Aabb::new(0.0, 10.0, 10.0, 10.0)));
        assert!(!a.intersects(&Aabb::new(20.0, 20.0, 1.0, 1.0)));
    }

    #[test]
    fn test_aabb_shrunk_keeps_center() {
        let a = Aabb::new(10.0, 20.0, 30.0, 30.0);
        let s = a.shrunk(0.5);
        assert_eq!(s.center(), a.center());
        assert!((s.width - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_tiles_spanned() {
        let (cols, rows) = tiles_spanned(&Aabb::new(30.0, 0.0, 24.0, 28.0), 32.0);
        assert_eq!(cols, 0..=1);
        assert_eq!(rows, 0..=0);

        let (cols, _) = tiles_spanned(&Aabb::new(-5.0, 0.0, 4.0, 4.0), 32.0);
        assert_eq!(cols, -1..=-1);
    }
}
