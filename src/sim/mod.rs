//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (bricks by id)
//! - No rendering or platform dependencies

pub mod ball;
pub mod collision;
pub mod levels;
pub mod state;
pub mod tick;

pub use ball::{Ball, regulate_velocity};
pub use collision::{Aabb, CollisionResult, ball_box_collision, ball_wall_collision};
pub use levels::{BrickLayout, LevelSetup, LevelTuning, level_setup, level_tuning};
pub use state::{Brick, GameEvent, GamePhase, GameState, Paddle, SessionRules};
pub use tick::{TickInput, tick};
