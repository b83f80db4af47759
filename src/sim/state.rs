//! Session state: players, phases, and the event stream consumers drain
//!
//! All state that must be persisted for replay/determinism lives here.

use std::collections::HashSet;

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::error::GameError;
use super::grid::{Direction, Grid};
use super::ray::Ray;
use crate::consts::INITIAL_SCORE;
use crate::settings::Difficulty;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Boards are being populated (in a duel, players place for each other)
    Setup,
    /// Commands accepted
    Active,
    /// Run ended
    Finished,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Every atom on the winner's probed board was found
    AllAtomsFound,
    /// A player's score reached zero or below
    ScoreExhausted,
}

/// Final standing of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winning player index; `None` when a solo run is lost
    pub winner: Option<usize>,
    pub reason: EndReason,
}

/// Output events, drained by the presentation layer.
///
/// The engine never logs through a global sink: everything it wants to say
/// flows out here (plus the per-step trace observer in `ray`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RayFired { player: usize, ray: Ray },
    GuessToggled { player: usize, pos: IVec2, active: bool },
    GuessesScored { player: usize, correct: u32, incorrect: u32 },
    ScoreChanged { player: usize, score: i32 },
    AtomRevealed { player: usize, pos: IVec2 },
    TurnPassed { player: usize },
    /// The tracer hit its loop guard; the ray was recorded as a reversal
    SimulationFault { player: usize, entry: IVec2, direction: Direction },
    GameEnded { winner: Option<usize>, reason: EndReason },
}

/// RNG seed wrapper so board setup is reproducible
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// One player's bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub score: i32,
    /// Fired rays, in firing order
    pub rays: Vec<Ray>,
    /// Pending guesses, toggleable until finalized
    pub guesses: HashSet<IVec2>,
    /// Atom positions already credited to this player
    pub found: HashSet<IVec2>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: INITIAL_SCORE,
            rays: Vec::new(),
            guesses: HashSet::new(),
            found: HashSet::new(),
        }
    }
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    /// `boards[i]` is the board player `i` probes; in a duel it was set up
    /// by their opponent
    boards: Vec<Board>,
    players: Vec<Player>,
    pub active_player: usize,
    /// Set when the phase flips to Finished
    pub result: Option<GameResult>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Solo session: the board is auto-populated from the seed and the
    /// session starts Active
    pub fn solo(name: impl Into<String>, difficulty: Difficulty, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let mut rng = rng_state.to_rng();
        let grid = Grid::new(difficulty.grid_size());
        let board = Board::random(grid, difficulty, &mut rng);
        log::debug!(
            "solo board ready: {} atoms on a {}x{} grid",
            board.atoms().len(),
            grid.size(),
            grid.size()
        );
        Self {
            seed,
            rng_state,
            difficulty,
            phase: GamePhase::Active,
            boards: vec![board],
            players: vec![Player::new(name)],
            active_player: 0,
            result: None,
            events: Vec::new(),
        }
    }

    /// Two-board duel. Boards start empty: each player hides atoms on the
    /// board their opponent will probe, then [`start`](Self::start) flips
    /// the session Active.
    pub fn duel(names: [String; 2], difficulty: Difficulty, seed: u64) -> Self {
        let grid = Grid::new(difficulty.grid_size());
        Self {
            seed,
            rng_state: RngState::new(seed),
            difficulty,
            phase: GamePhase::Setup,
            boards: vec![Board::empty(grid), Board::empty(grid)],
            players: names.into_iter().map(Player::new).collect(),
            active_player: 0,
            result: None,
            events: Vec::new(),
        }
    }

    /// Duel setup: `placer` hides an atom on the opponent's probed board
    pub fn place_atom(&mut self, placer: usize, pos: IVec2) -> Result<(), GameError> {
        if self.phase != GamePhase::Setup {
            return Err(GameError::GameOver);
        }
        let target = (placer + 1) % self.players.len();
        self.boards[target].place(pos)
    }

    /// Leave Setup once every board holds an in-range atom count
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Setup {
            return Err(GameError::GameOver);
        }
        let range = self.difficulty.atom_count();
        for (i, board) in self.boards.iter().enumerate() {
            let atoms = board.atoms().len() as u32;
            if !range.contains(&atoms) {
                return Err(GameError::SetupIncomplete { board: i, atoms });
            }
        }
        self.phase = GamePhase::Active;
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> &Player {
        &self.players[index]
    }

    /// The board player `index` probes
    pub fn board(&self, index: usize) -> &Board {
        &self.boards[index]
    }

    pub(crate) fn player_mut(&mut self, index: usize) -> &mut Player {
        &mut self.players[index]
    }

    pub(crate) fn board_mut(&mut self, index: usize) -> &mut Board {
        &mut self.boards[index]
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain everything emitted since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Close the session
    pub(crate) fn finish(&mut self, winner: Option<usize>, reason: EndReason) {
        self.phase = GamePhase::Finished;
        self.result = Some(GameResult { winner, reason });
        self.events.push(GameEvent::GameEnded { winner, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solo_session_is_immediately_active() {
        let state = GameState::solo("Ada", Difficulty::Easy, 42);
        assert_eq!(state.phase, GamePhase::Active);
        assert_eq!(state.players().len(), 1);
        assert_eq!(state.player(0).score, INITIAL_SCORE);
        let count = state.board(0).atoms().len() as u32;
        assert!(Difficulty::Easy.atom_count().contains(&count));
    }

    #[test]
    fn test_solo_boards_match_for_equal_seeds() {
        let a = GameState::solo("Ada", Difficulty::Medium, 1234);
        let b = GameState::solo("Bey", Difficulty::Medium, 1234);
        assert_eq!(a.board(0).atoms(), b.board(0).atoms());
    }

    #[test]
    fn test_duel_placement_targets_opponent_board() {
        let mut state = GameState::duel(
            ["Ada".to_string(), "Bey".to_string()],
            Difficulty::Easy,
            7,
        );
        assert_eq!(state.phase, GamePhase::Setup);
        state.place_atom(0, IVec2::new(2, 2)).unwrap();
        assert!(state.board(1).contains(IVec2::new(2, 2)));
        assert!(!state.board(0).contains(IVec2::new(2, 2)));
    }

    #[test]
    fn test_duel_start_requires_full_boards() {
        let mut state = GameState::duel(
            ["Ada".to_string(), "Bey".to_string()],
            Difficulty::Easy,
            7,
        );
        for i in 0..3 {
            state.place_atom(0, IVec2::new(i, 0)).unwrap();
        }
        // Player 1 placed nothing for player 0
        assert_eq!(
            state.start(),
            Err(GameError::SetupIncomplete { board: 0, atoms: 0 })
        );
        for i in 0..3 {
            state.place_atom(1, IVec2::new(i, 1)).unwrap();
        }
        state.start().unwrap();
        assert_eq!(state.phase, GamePhase::Active);
        // Placement is sealed once the session is live
        assert_eq!(
            state.place_atom(0, IVec2::new(4, 4)),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn test_take_events_drains() {
        let mut state = GameState::solo("Ada", Difficulty::Easy, 42);
        state.push_event(GameEvent::TurnPassed { player: 0 });
        assert_eq!(state.take_events().len(), 1);
        assert!(state.take_events().is_empty());
    }
}
