//! Error taxonomy for board setup and player commands

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Why a board mutation or player command was refused.
///
/// Everything except `SimulationCycle` is a caller error: the command is
/// rejected and no state changes. `SimulationCycle` reports a broken
/// deflection invariant inside the ray simulator and is fatal for that ray
/// only; the session survives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameError {
    /// Coordinate outside `[-1, size]²` or off the interior where one was required
    OutOfBounds { pos: IVec2 },
    /// Setup-time placement collision
    DuplicateAtom { pos: IVec2 },
    /// Ray entry off the ring, on a corner, or aimed outward
    InvalidEntry { pos: IVec2 },
    /// Guess outside the interior
    InvalidGuess { pos: IVec2 },
    /// The tracer revisited a (position, direction) state
    SimulationCycle { pos: IVec2 },
    /// A duel board left Setup with an atom count outside the difficulty range
    SetupIncomplete { board: usize, atoms: u32 },
    /// Command issued while the session was not accepting it
    GameOver,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { pos } => {
                write!(f, "coordinate ({}, {}) is out of bounds", pos.x, pos.y)
            }
            Self::DuplicateAtom { pos } => {
                write!(f, "an atom already occupies ({}, {})", pos.x, pos.y)
            }
            Self::InvalidEntry { pos } => {
                write!(f, "({}, {}) is not a valid ray entry", pos.x, pos.y)
            }
            Self::InvalidGuess { pos } => {
                write!(f, "({}, {}) is not a guessable cell", pos.x, pos.y)
            }
            Self::SimulationCycle { pos } => {
                write!(f, "ray simulation cycled at ({}, {})", pos.x, pos.y)
            }
            Self::SetupIncomplete { board, atoms } => {
                write!(f, "board {board} holds {atoms} atoms, outside the difficulty range")
            }
            Self::GameOver => write!(f, "the session is not accepting commands"),
        }
    }
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_coordinates() {
        let err = GameError::DuplicateAtom {
            pos: IVec2::new(3, 5),
        };
        assert_eq!(err.to_string(), "an atom already occupies (3, 5)");
    }
}
