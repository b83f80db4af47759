//! High score leaderboard
//!
//! Persisted as a JSON file next to the executable, tracks the top 10
//! finished runs.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player name
    pub name: String,
    /// Final score of the run
    pub score: i32,
    /// Difficulty the run was played at
    pub difficulty: Difficulty,
    /// Rays spent over the run
    pub rays_fired: u32,
    /// Atoms found out of the board's total
    pub atoms_found: u32,
    /// Unix timestamp (seconds) when achieved
    pub timestamp: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Leaderboard file name, stored next to the executable
    const FILE_NAME: &'static str = "atombox_highscores.json";

    /// Create an empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: i32) -> bool {
        if score <= 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't
    /// qualify)
    pub fn potential_rank(&self, score: i32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<i32> {
        self.entries.first().map(|e| e.score)
    }

    fn path() -> PathBuf {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join(Self::FILE_NAME);
            }
        }
        PathBuf::from(Self::FILE_NAME)
    }

    /// Load high scores, starting fresh on a missing or corrupt file
    pub fn load() -> Self {
        if let Ok(json) = fs::read_to_string(Self::path()) {
            if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                log::info!("Loaded {} high scores", scores.entries.len());
                return scores;
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores; failures are logged, not fatal
    pub fn save(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(Self::path(), json) {
                    log::warn!("Failed to save high scores: {e}");
                } else {
                    log::info!("High scores saved ({} entries)", self.entries.len());
                }
            }
            Err(e) => log::warn!("Failed to serialize high scores: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: i32) -> HighScoreEntry {
        HighScoreEntry {
            name: "Ada".to_string(),
            score,
            difficulty: Difficulty::Medium,
            rays_fired: 10,
            atoms_found: 4,
            timestamp: 0,
        }
    }

    #[test]
    fn test_zero_and_negative_scores_never_qualify() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(!scores.qualifies(-3));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_entries_stay_sorted_and_capped() {
        let mut scores = HighScores::new();
        for s in [5, 20, 10, 1, 15, 8, 30, 2, 12, 7, 9, 3] {
            scores.add_score(entry(s));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(30));
        assert!(
            scores
                .entries
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score)
        );
    }

    #[test]
    fn test_rank_reported_for_qualifying_scores() {
        let mut scores = HighScores::new();
        scores.add_score(entry(20));
        scores.add_score(entry(10));
        assert_eq!(scores.potential_rank(15), Some(2));
        assert_eq!(scores.add_score(entry(15)), Some(2));
        assert_eq!(scores.potential_rank(0), None);
    }
}
