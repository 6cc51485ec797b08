//! High score leaderboard system
//!
//! Persisted to a JSON file, tracks the top 8 scores.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 8;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    /// Date achieved, `MM-dd-yyyy`
    pub date: String,
}

/// High score table, sorted descending by score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(default)]
    pub scores: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self { scores: Vec::new() }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.scores.len() < MAX_ENTRIES {
            return true;
        }
        // Must beat the lowest entry
        self.scores.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.scores.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.scores.len()) + 1)
    }

    /// Add a new score (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, name: &str, score: u64, date: String) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = LeaderboardEntry {
            name: name.to_string(),
            score,
            date,
        };

        // Equal scores keep their earlier position
        let pos = self.scores.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.scores.insert(i, entry);
                i + 1
            }
            None => {
                self.scores.push(entry);
                self.scores.len()
            }
        };

        self.scores.truncate(MAX_ENTRIES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.scores.first().map(|e| e.score)
    }

    /// Restore ordering and size bounds on data read from disk
    fn normalize(&mut self) {
        self.scores.sort_by(|a, b| b.score.cmp(&a.score));
        self.scores.truncate(MAX_ENTRIES);
    }

    /// One display line per entry
    pub fn display_lines(&self) -> Vec<String> {
        self.scores
            .iter()
            .map(|e| format!("Player: {}  Score: {}  Date: {}", e.name, e.score, e.date))
            .collect()
    }

    /// Load the leaderboard from a JSON file. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No leaderboard at {}, starting fresh", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        let mut board: Leaderboard =
            serde_json::from_str(&json).map_err(|e| Error::json(path, e))?;
        board.normalize();
        log::info!("Loaded {} leaderboard entries", board.scores.len());
        Ok(board)
    }

    /// Save the leaderboard, replacing the file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| Error::json(path, e))?;
        let tmp = tmp_path(path);
        fs::write(&tmp, json).map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;

        log::info!("Leaderboard saved ({} entries)", self.scores.len());
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Leaderboard bound to its backing file; every accepted score is written through
#[derive(Debug)]
pub struct LeaderboardStore {
    path: PathBuf,
    board: Leaderboard,
}

impl LeaderboardStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let board = Leaderboard::load(&path)?;
        Ok(Self { path, board })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn board(&self) -> &Leaderboard {
        &self.board
    }

    /// Record a score dated today and persist if it made the table
    pub fn add_score(&mut self, name: &str, score: u64) -> Result<Option<usize>> {
        self.add_score_on(name, score, today())
    }

    /// The table in memory only changes once the file has been written
    pub fn add_score_on(&mut self, name: &str, score: u64, date: String) -> Result<Option<usize>> {
        let mut board = self.board.clone();
        let rank = board.add_score(name, score, date);
        match rank {
            Some(rank) => {
                board.save(&self.path)?;
                log::info!("{} placed #{} with {}", name, rank, score);
                self.board = board;
            }
            None => log::debug!("Score {} did not make the leaderboard", score),
        }
        Ok(rank)
    }
}

/// Date format stored with each entry
pub const DATE_FORMAT: &str = "%m-%d-%Y";

/// Today's local date as `MM-dd-yyyy`
pub fn today() -> String {
    format_date(Local::now().date_naive())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
