//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (board setup)
//! - Ray traces are a function of (board, entry, direction) alone
//! - Stable iteration order (guesses sorted before scoring)
//! - No I/O or platform dependencies

pub mod board;
pub mod error;
pub mod grid;
pub mod ray;
pub mod state;
pub mod turn;

pub use board::{Atom, Board, Corner};
pub use error::GameError;
pub use grid::{Direction, Grid};
pub use ray::{Ray, RayOutcome, StepKind, TraceStep, deflect, trace, trace_with};
pub use state::{
    EndReason, GameEvent, GamePhase, GameResult, GameState, Player, RngState,
};
pub use turn::{Command, apply, end_turn, finalize_guesses, fire_ray, toggle_guess};
