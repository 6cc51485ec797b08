//! Brickfall - a Breakout arcade game with an agent-controlled paddle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, levels, game state machine)
//! - `agent`: Observation/reward boundary for an externally trained paddle agent
//! - `game`: Fixed-timestep host driving one game or a two-game match
//! - `leaderboard`: Bounded high-score table persisted as JSON
//! - `settings`: Game configuration
//! - `ui`: HUD text adapters

pub mod agent;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod settings;
pub mod sim;
pub mod ui;

pub use error::{Error, Result};
pub use game::{Game, Match, MatchOutcome};
pub use leaderboard::Leaderboard;
pub use settings::{Difficulty, GameConfig, GameMode, PlayerType, ScreenPosition};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Field dimensions (world units, relative to the field origin)
    pub const FIELD_HALF_WIDTH: f32 = 7.0;
    pub const CEILING_Y: f32 = 4.5;
    /// Ball below this line is lost
    pub const BALL_LOSS_Y: f32 = -5.5;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.1;
    /// Maximum total ball speed
    pub const BALL_MAX_VELOCITY: f32 = 7.0;
    /// Minimum vertical ball speed
    pub const BALL_MIN_VELOCITY_Y: f32 = 3.0;

    /// Paddle defaults
    pub const PADDLE_START_Y: f32 = -4.0;
    pub const PADDLE_WIDTH: f32 = 1.5;
    pub const PADDLE_HEIGHT: f32 = 0.25;
    pub const PADDLE_SPEED: f32 = 14.0;
    /// Horizontal travel limit for a human paddle
    pub const PADDLE_MAX_X: f32 = 6.0;
    /// Horizontal travel limit for an agent paddle
    pub const AGENT_PADDLE_MAX_X: f32 = 4.5;
    /// Maximum deflection added by an off-center paddle hit
    pub const PADDLE_ENGLISH: f32 = 0.6;

    /// Brick grid
    pub const BRICK_COLS: usize = 9;
    pub const BRICK_ROWS: usize = 6;
    pub const BRICK_SPACING_X: f32 = 0.7;
    pub const BRICK_SPACING_Y: f32 = 0.25;
    pub const BRICK_WIDTH: f32 = 0.64;
    pub const BRICK_HEIGHT: f32 = 0.22;
    /// Y of the bottom brick row
    pub const BRICK_ORIGIN_Y: f32 = 1.5;

    /// Scoring and progression
    pub const START_LIVES: u32 = 5;
    pub const BASE_BRICK_VALUE: u32 = 10;
    pub const FINAL_LEVEL: u32 = 5;
    /// Level 1 advances once this many bricks remain; the survivors carry into level 2
    pub const LEVEL_ONE_CARRYOVER_BRICKS: u32 = 27;
    /// Clearing a level in this many seconds earns exactly the full bonus
    pub const BONUS_REFERENCE_SECS: f32 = 30.0;

    /// Timers
    pub const DEFAULT_COUNTDOWN_SECS: f32 = 3.0;
    pub const BANNER_SECS: f32 = 2.0;
}

/// Convert a duration in seconds to a whole number of simulation ticks
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    (secs.max(0.0) / consts::SIM_DT).round() as u32
}

/// Convert simulation ticks to seconds
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 * consts::SIM_DT
}
