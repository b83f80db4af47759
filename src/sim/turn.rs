//! Player commands: validation, scoring, and termination checks
//!
//! The command layer owns every score mutation. The tracer itself never
//! touches player state, and a rejected command changes nothing.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::error::GameError;
use super::grid::Direction;
use super::ray::{self, Ray, RayOutcome};
use super::state::{EndReason, GameEvent, GamePhase, GameState};
use crate::consts::{CORRECT_GUESS_BONUS, RAY_COST, WRONG_GUESS_PENALTY};

/// Commands the presentation layer can issue for the active player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    FireRay { entry: IVec2, direction: Direction },
    ToggleGuess { pos: IVec2 },
    FinalizeGuesses,
    EndTurn,
}

/// Apply one command for the active player
pub fn apply(state: &mut GameState, command: Command) -> Result<(), GameError> {
    match command {
        Command::FireRay { entry, direction } => fire_ray(state, entry, direction).map(|_| ()),
        Command::ToggleGuess { pos } => toggle_guess(state, pos).map(|_| ()),
        Command::FinalizeGuesses => finalize_guesses(state),
        Command::EndTurn => end_turn(state),
    }
}

fn ensure_active(state: &GameState) -> Result<(), GameError> {
    if state.phase == GamePhase::Active {
        Ok(())
    } else {
        Err(GameError::GameOver)
    }
}

/// Fire a ray for the active player.
///
/// The ray cost is deducted before the simulator runs; repeated identical
/// rays are allowed and each costs the same. A `SimulationCycle` inside the
/// tracer is downgraded here: the cost stays paid, the ray is recorded as a
/// reversal to its entry, and a distinct fault event is emitted.
pub fn fire_ray(
    state: &mut GameState,
    entry: IVec2,
    direction: Direction,
) -> Result<Ray, GameError> {
    ensure_active(state)?;
    let player = state.active_player;
    let grid = state.board(player).grid();
    if grid.inward_direction(entry) != Some(direction) {
        return Err(GameError::InvalidEntry { pos: entry });
    }

    let p = state.player_mut(player);
    p.score -= RAY_COST;
    let score = p.score;
    state.push_event(GameEvent::ScoreChanged { player, score });

    let ray = match ray::trace(state.board(player), entry, direction) {
        Ok(ray) => ray,
        Err(err) => {
            log::error!("ray simulation failed: {err}");
            state.push_event(GameEvent::SimulationFault {
                player,
                entry,
                direction,
            });
            Ray {
                entry,
                direction,
                path: vec![entry],
                outcome: RayOutcome::DoubleDeflected { exit: entry },
            }
        }
    };

    state.player_mut(player).rays.push(ray.clone());
    state.push_event(GameEvent::RayFired {
        player,
        ray: ray.clone(),
    });

    check_termination(state, player);
    Ok(ray)
}

/// Toggle a pending guess. Returns the resulting membership.
pub fn toggle_guess(state: &mut GameState, pos: IVec2) -> Result<bool, GameError> {
    ensure_active(state)?;
    let player = state.active_player;
    if !state.board(player).grid().is_interior(pos) {
        return Err(GameError::InvalidGuess { pos });
    }
    let p = state.player_mut(player);
    let active = if p.guesses.remove(&pos) {
        false
    } else {
        p.guesses.insert(pos);
        true
    };
    state.push_event(GameEvent::GuessToggled { player, pos, active });
    Ok(active)
}

/// Score the active player's pending guesses.
///
/// Every guessed atom not yet credited earns the bonus once and is
/// revealed; every guessed empty cell costs the penalty. The pending set is
/// cleared afterwards; credited positions live on in `Player::found`,
/// which is the once-per-atom guard.
pub fn finalize_guesses(state: &mut GameState) -> Result<(), GameError> {
    ensure_active(state)?;
    let player = state.active_player;

    // Sorted order keeps the event stream reproducible
    let mut guesses: Vec<IVec2> = state.player(player).guesses.iter().copied().collect();
    guesses.sort_by_key(|p| (p.y, p.x));

    let mut correct = 0u32;
    let mut incorrect = 0u32;
    let mut delta = 0i32;
    for pos in guesses {
        if state.board(player).contains(pos) {
            if !state.player(player).found.contains(&pos) {
                state.board_mut(player).reveal(pos);
                state.player_mut(player).found.insert(pos);
                correct += 1;
                delta += CORRECT_GUESS_BONUS;
                state.push_event(GameEvent::AtomRevealed { player, pos });
            }
        } else {
            incorrect += 1;
            delta -= WRONG_GUESS_PENALTY;
        }
    }

    let p = state.player_mut(player);
    p.guesses.clear();
    p.score += delta;
    let score = p.score;
    state.push_event(GameEvent::GuessesScored {
        player,
        correct,
        incorrect,
    });
    state.push_event(GameEvent::ScoreChanged { player, score });

    check_termination(state, player);
    Ok(())
}

/// Pass the turn to the next player (a no-op rotation solo)
pub fn end_turn(state: &mut GameState) -> Result<(), GameError> {
    ensure_active(state)?;
    state.active_player = (state.active_player + 1) % state.players().len();
    let player = state.active_player;
    state.push_event(GameEvent::TurnPassed { player });
    Ok(())
}

/// Termination predicate, checked after every ray fire and finalization.
///
/// Finding the last atom wins even if the same finalization drove the
/// score to zero; otherwise a score at or below zero ends the run on the
/// spot.
fn check_termination(state: &mut GameState, player: usize) {
    if state.phase != GamePhase::Active {
        return;
    }
    let board = state.board(player);
    if !board.atoms().is_empty() && board.all_revealed() {
        state.finish(Some(player), EndReason::AllAtomsFound);
        return;
    }
    if state.player(player).score <= 0 {
        let winner = if state.players().len() > 1 {
            Some((player + 1) % state.players().len())
        } else {
            None
        };
        state.finish(winner, EndReason::ScoreExhausted);
    }
}
