//! Ball entity and velocity regulation

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Clamp a ball velocity into the playable envelope.
///
/// A frozen ball has zero velocity. Otherwise the vertical speed is raised to
/// `min_velocity_y` (keeping its direction; a level ball is sent downward) and the
/// total speed is capped at `max_velocity`. When capping would pull the vertical
/// speed back under the minimum, the horizontal component gives way instead.
pub fn regulate_velocity(vel: Vec2, frozen: bool, min_velocity_y: f32, max_velocity: f32) -> Vec2 {
    if frozen {
        return Vec2::ZERO;
    }

    let min_y = min_velocity_y.min(max_velocity);
    let dir_y = if vel.y > 0.0 { 1.0 } else { -1.0 };
    let mut v = vel;

    if v.y.abs() < min_y {
        v.y = dir_y * min_y;
    }

    let speed = v.length();
    if speed > max_velocity {
        v *= max_velocity / speed;
        if v.y.abs() < min_y {
            let dir_x = if v.x < 0.0 { -1.0 } else { 1.0 };
            v.y = dir_y * min_y;
            v.x = dir_x * (max_velocity * max_velocity - min_y * min_y).max(0.0).sqrt();
        }
    }

    v
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub frozen: bool,
    /// Speed cap; raised as levels advance
    pub max_velocity: f32,
    pub min_velocity_y: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            frozen: true,
            max_velocity: BALL_MAX_VELOCITY,
            min_velocity_y: BALL_MIN_VELOCITY_Y,
        }
    }
}

impl Ball {
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.vel = Vec2::ZERO;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Apply [`regulate_velocity`] to this ball
    pub fn regulate(&mut self) {
        self.vel = regulate_velocity(self.vel, self.frozen, self.min_velocity_y, self.max_velocity);
    }

    /// Whether the ball has fallen past the loss line
    pub fn is_lost(&self) -> bool {
        self.pos.y < BALL_LOSS_Y
    }

    pub fn is_moving(&self) -> bool {
        !self.frozen && self.vel.length_squared() > 0.0
    }

    /// Raise the speed cap by `percent` (0.1 = +10%)
    pub fn speed_up(&mut self, percent: f32) {
        self.max_velocity *= 1.0 + percent;
    }

    /// Serve position: mid-field, a random distance left or right of center
    pub fn reset<R: Rng>(&mut self, origin_x: f32, rng: &mut R) {
        let x = if rng.random_bool(0.5) {
            rng.random_range(-4.0..-2.0)
        } else {
            rng.random_range(2.0..4.0)
        };
        self.pos = Vec2::new(origin_x + x, 0.0);
        // Half the cap on each axis, heading down and right
        self.vel = Vec2::new(1.0, -1.0) * (self.max_velocity / 2.0);
        if self.frozen {
            self.vel = Vec2::ZERO;
        }
    }

    /// Velocity the ball is served with once play starts
    pub fn serve_velocity(&self) -> Vec2 {
        Vec2::new(1.0, -1.0) * (self.max_velocity / 2.0)
    }
}
