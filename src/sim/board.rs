//! Atoms and the board that hides them
//!
//! The atom set is immutable after setup. `revealed` is the only field that
//! changes later, and only when a finalized guess credits the atom.

use glam::IVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::error::GameError;
use super::grid::Grid;
use crate::settings::Difficulty;

/// Which diagonal corner of a probed cell an atom occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All corners, in a fixed order so adjacency queries are deterministic
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Offset from the probed cell to the atom occupying this corner
    #[inline]
    pub fn offset(self) -> IVec2 {
        match self {
            Corner::TopLeft => IVec2::new(-1, -1),
            Corner::TopRight => IVec2::new(1, -1),
            Corner::BottomLeft => IVec2::new(-1, 1),
            Corner::BottomRight => IVec2::new(1, 1),
        }
    }
}

/// A hidden atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub pos: IVec2,
    /// Set once a finalized guess credits this atom
    pub revealed: bool,
}

impl Atom {
    pub fn new(pos: IVec2) -> Self {
        Self {
            pos,
            revealed: false,
        }
    }
}

/// The playing field and its hidden atom set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    grid: Grid,
    atoms: Vec<Atom>,
}

impl Board {
    /// An empty board awaiting placement (duel setup)
    pub fn empty(grid: Grid) -> Self {
        Self {
            grid,
            atoms: Vec::new(),
        }
    }

    /// Auto-populated board. The atom count is drawn uniformly from the
    /// difficulty's range; positions are drawn from `[1, size-2]²` so no
    /// generated atom touches the interior's outermost ring. Collisions
    /// redraw.
    pub fn random(grid: Grid, difficulty: Difficulty, rng: &mut Pcg32) -> Self {
        let mut board = Self::empty(grid);
        let count = rng.random_range(difficulty.atom_count()) as usize;
        while board.atoms.len() < count {
            let pos = IVec2::new(
                rng.random_range(1..=grid.size() - 2),
                rng.random_range(1..=grid.size() - 2),
            );
            let _ = board.place(pos);
        }
        board
    }

    #[inline]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Hide an atom at `pos`
    pub fn place(&mut self, pos: IVec2) -> Result<(), GameError> {
        if !self.grid.is_interior(pos) {
            return Err(GameError::OutOfBounds { pos });
        }
        if self.contains(pos) {
            return Err(GameError::DuplicateAtom { pos });
        }
        self.atoms.push(Atom::new(pos));
        Ok(())
    }

    /// Exact-cell occupancy, used for hit detection
    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        self.atoms.iter().any(|a| a.pos == pos)
    }

    /// The atom exactly at `pos`, if any
    pub fn at(&self, pos: IVec2) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.pos == pos)
    }

    /// Atoms diagonally adjacent to `pos` (|dx| = |dy| = 1), each tagged
    /// with the corner of `pos` it occupies
    pub fn diagonal_neighbors(&self, pos: IVec2) -> Vec<(Corner, IVec2)> {
        Corner::ALL
            .iter()
            .filter_map(|&corner| {
                let cell = pos + corner.offset();
                self.contains(cell).then_some((corner, cell))
            })
            .collect()
    }

    /// Mark the atom at `pos` revealed. Returns false if there is none.
    pub fn reveal(&mut self, pos: IVec2) -> bool {
        match self.atoms.iter_mut().find(|a| a.pos == pos) {
            Some(atom) => {
                atom.revealed = true;
                true
            }
            None => false,
        }
    }

    /// True once every atom has been revealed
    pub fn all_revealed(&self) -> bool {
        self.atoms.iter().all(|a| a.revealed)
    }
}
