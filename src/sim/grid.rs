//! Board geometry: the interior, the entry ring, and ray directions
//!
//! Coordinates follow screen convention: x grows right, y grows down.
//! The interior is `[0, size)²`; the entry ring sits one step outside it
//! (x or y equal to -1 or `size`). The four ring corners are not valid
//! ray entries.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_GRID_SIZE;

/// Cardinal ray directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in a fixed order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step for this direction
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// The opposite direction
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// The square playing field and its surrounding entry ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: i32,
}

impl Grid {
    /// Create a grid with a `size × size` interior.
    ///
    /// Sizes come from [`Difficulty`](crate::settings::Difficulty); anything
    /// below [`MIN_GRID_SIZE`] is not a playable board.
    pub fn new(size: i32) -> Self {
        debug_assert!(size >= MIN_GRID_SIZE, "grid size {size} below minimum");
        Self { size }
    }

    /// Interior edge length
    #[inline]
    pub fn size(&self) -> i32 {
        self.size
    }

    /// True for cells inside the playing field
    #[inline]
    pub fn is_interior(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.size && pos.y >= 0 && pos.y < self.size
    }

    /// True for any coordinate in `[-1, size]²`
    #[inline]
    pub fn in_range(&self, pos: IVec2) -> bool {
        pos.x >= -1 && pos.x <= self.size && pos.y >= -1 && pos.y <= self.size
    }

    /// True for the four ring corners, which rays can neither enter nor exit
    #[inline]
    pub fn is_corner(&self, pos: IVec2) -> bool {
        (pos.x == -1 || pos.x == self.size) && (pos.y == -1 || pos.y == self.size)
    }

    /// True for ring cells a ray may enter or exit through
    pub fn is_boundary_entry(&self, pos: IVec2) -> bool {
        if !self.in_range(pos) || self.is_corner(pos) {
            return false;
        }
        pos.x == -1 || pos.x == self.size || pos.y == -1 || pos.y == self.size
    }

    /// The single direction leading from a boundary entry into the interior
    pub fn inward_direction(&self, entry: IVec2) -> Option<Direction> {
        if !self.is_boundary_entry(entry) {
            return None;
        }
        if entry.x == -1 {
            Some(Direction::Right)
        } else if entry.x == self.size {
            Some(Direction::Left)
        } else if entry.y == -1 {
            Some(Direction::Down)
        } else {
            Some(Direction::Up)
        }
    }

    /// Every valid entry cell, one side at a time
    pub fn boundary_entries(&self) -> impl Iterator<Item = IVec2> + '_ {
        let size = self.size;
        (0..size).flat_map(move |i| {
            [
                IVec2::new(i, -1),
                IVec2::new(i, size),
                IVec2::new(-1, i),
                IVec2::new(size, i),
            ]
        })
    }
}
