//! Game settings and preferences
//!
//! Loaded from a JSON file; any missing field takes its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Agent skill level, selecting which trained model drives the agent paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" | "easy" => Some(Difficulty::Beginner),
            "intermediate" | "medium" => Some(Difficulty::Intermediate),
            "advanced" | "hard" => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    /// Model resource handed to the external inference framework
    pub fn model_path(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "NNModels/AgentBeginner",
            Difficulty::Intermediate => "NNModels/AgentIntermediate",
            Difficulty::Advanced => "NNModels/AgentAdvanced",
        }
    }
}

/// How many games run and who controls them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// One agent game that restarts instead of ending
    Training,
    /// One human game
    #[default]
    Single,
    /// Human game and agent game side by side
    Double,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Training => "Training",
            GameMode::Single => "Single",
            GameMode::Double => "Double",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "training" | "train" => Some(GameMode::Training),
            "single" => Some(GameMode::Single),
            "double" | "versus" => Some(GameMode::Double),
            _ => None,
        }
    }
}

/// Who controls a game's paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerType {
    /// Human playing alone
    Single,
    /// Human playing against an agent
    Player,
    /// Agent-controlled paddle
    Agent,
}

impl PlayerType {
    /// Horizontal travel limit of the paddle
    pub fn paddle_max_x(&self) -> f32 {
        match self {
            PlayerType::Agent => AGENT_PADDLE_MAX_X,
            PlayerType::Single | PlayerType::Player => PADDLE_MAX_X,
        }
    }

    /// Whether scores from this side are recorded on the leaderboard
    pub fn records_scores(&self) -> bool {
        !matches!(self, PlayerType::Agent)
    }
}

/// Horizontal placement of a game field on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScreenPosition {
    Left,
    #[default]
    Center,
    Right,
}

impl ScreenPosition {
    /// X of the field center in world units
    pub fn origin_x(&self) -> f32 {
        match self {
            ScreenPosition::Left => -4.0,
            ScreenPosition::Center => 0.0,
            ScreenPosition::Right => 4.0,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Progress through all levels; when false the game ends after level 1
    pub multi_level: bool,
    /// Enables the skip-level input
    pub debug: bool,
    /// Seconds spent in Preparing before play resumes (training ignores this)
    pub countdown_secs: f32,
    /// Name recorded with leaderboard entries
    pub player_name: String,
    /// Leaderboard JSON file
    pub leaderboard_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Single,
            difficulty: Difficulty::Beginner,
            multi_level: true,
            debug: false,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            player_name: "Player".to_string(),
            leaderboard_path: PathBuf::from("leaderboard.json"),
        }
    }
}

impl GameConfig {
    pub fn is_training(&self) -> bool {
        self.mode == GameMode::Training
    }

    /// Countdown actually used: training episodes restart immediately
    pub fn effective_countdown_secs(&self) -> f32 {
        if self.is_training() {
            0.0
        } else {
            self.countdown_secs
        }
    }

    /// Reject values the simulation can't run with
    pub fn validate(&self) -> Result<()> {
        if !self.countdown_secs.is_finite() || self.countdown_secs < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "countdown_secs must be a non-negative number, got {}",
                self.countdown_secs
            )));
        }
        if self.player_name.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "player_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<GameConfig>(&json) {
                Ok(config) => match config.validate() {
                    Ok(()) => {
                        log::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
                },
                Err(e) => log::warn!("Ignoring {}: {}", path.display(), Error::json(path, e)),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Ignoring {}: {}", path.display(), Error::io(path, e)),
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::json(path, e))?;
        fs::write(path, json).map_err(|e| Error::io(path, e))?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(Difficulty::from_str("ADVANCED"), Some(Difficulty::Advanced));
        assert_eq!(Difficulty::from_str("medium"), Some(Difficulty::Intermediate));
        assert_eq!(Difficulty::from_str("impossible"), None);
        assert_eq!(
            Difficulty::Intermediate.model_path(),
            "NNModels/AgentIntermediate"
        );
    }

    #[test]
    fn test_training_skips_countdown() {
        let config = GameConfig {
            mode: GameMode::Training,
            countdown_secs: 3.0,
            ..Default::default()
        };
        assert_eq!(config.effective_countdown_secs(), 0.0);
        assert_eq!(GameConfig::default().effective_countdown_secs(), 3.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"mode":"Double","debug":true}"#).unwrap();
        assert_eq!(config.mode, GameMode::Double);
        assert!(config.debug);
        assert!(config.multi_level);
        assert_eq!(config.player_name, "Player");
    }

    #[test]
    fn test_validate_rejects_negative_countdown() {
        let config = GameConfig {
            countdown_secs: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load(&dir.path().join("nope.json"));
        assert_eq!(config.mode, GameMode::Single);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = GameConfig {
            mode: GameMode::Training,
            difficulty: Difficulty::Advanced,
            player_name: "Ada".to_string(),
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = GameConfig::load(&path);
        assert_eq!(loaded.mode, GameMode::Training);
        assert_eq!(loaded.difficulty, Difficulty::Advanced);
        assert_eq!(loaded.player_name, "Ada");
    }

    #[test]
    fn test_agent_paddle_travel_is_narrower() {
        assert!(PlayerType::Agent.paddle_max_x() < PlayerType::Single.paddle_max_x());
        assert!(!PlayerType::Agent.records_scores());
        assert!(PlayerType::Player.records_scores());
    }
}
