//! Difficulty presets and player preferences
//!
//! Preferences persist as a JSON file next to the executable, separately
//! from anything the engine owns.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Difficulty tiers, mapped to board size and hidden atom count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Interior edge length for this tier
    pub fn grid_size(&self) -> i32 {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Medium => 8,
            Difficulty::Hard => 10,
        }
    }

    /// Hidden atom count range; the exact count is drawn uniformly at
    /// board-setup time
    pub fn atom_count(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            Difficulty::Easy => 3..=4,
            Difficulty::Medium => 4..=5,
            Difficulty::Hard => 5..=6,
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Default difficulty for new sessions
    pub difficulty: Difficulty,
    /// Name recorded on the leaderboard
    pub player_name: String,

    // === Presentation ===
    /// Annotate double-deflected rays distinctly instead of showing a
    /// plain reversal
    pub highlight_detours: bool,
    /// Echo the full cell path of each fired ray
    pub show_ray_paths: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            player_name: "Player".to_string(),
            highlight_detours: true,
            show_ray_paths: false,
        }
    }
}

impl Settings {
    /// Settings file name, stored next to the executable
    const FILE_NAME: &'static str = "atombox_settings.json";

    fn path() -> PathBuf {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join(Self::FILE_NAME);
            }
        }
        PathBuf::from(Self::FILE_NAME)
    }

    /// Load settings, falling back to defaults on a missing or corrupt file
    pub fn load() -> Self {
        if let Ok(json) = fs::read_to_string(Self::path()) {
            if let Ok(settings) = serde_json::from_str(&json) {
                log::info!("Loaded settings from {:?}", Self::path());
                return settings;
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings; failures are logged, not fatal
    pub fn save(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(Self::path(), json) {
                    log::warn!("Failed to save settings: {e}");
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }
}
