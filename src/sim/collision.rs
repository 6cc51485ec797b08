//! Collision detection and response for axis-aligned geometry
//!
//! Bricks, the paddle and the field walls are all boxes; the ball is a circle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by its center and half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let d = (p - self.center).abs();
        d.x <= self.half.x && d.y <= self.half.y
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Collision point (if hit)
    pub point: Vec2,
    /// Surface normal at collision (pointing toward ball center, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a box
///
/// Uses the closest point on the box to the ball center. When the center is
/// already inside the box, the normal is taken from the axis of least
/// penetration.
pub fn ball_box_collision(ball_pos: Vec2, ball_radius: f32, rect: &Aabb) -> CollisionResult {
    let closest = ball_pos.clamp(rect.min(), rect.max());
    let offset = ball_pos - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > ball_radius * ball_radius {
        return CollisionResult::miss();
    }

    if dist_sq > 1e-12 {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: offset / dist,
            penetration: ball_radius - dist,
        };
    }

    // Center inside the box (tunneling) - push out along the shallowest axis
    let local = ball_pos - rect.center;
    let depth = rect.half - local.abs();
    let (normal, penetration) = if depth.x < depth.y {
        (Vec2::new(local.x.signum(), 0.0), depth.x + ball_radius)
    } else {
        (Vec2::new(0.0, local.y.signum()), depth.y + ball_radius)
    };

    CollisionResult {
        hit: true,
        point: ball_pos,
        normal,
        penetration,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce off the paddle top, steering by where the ball struck it
///
/// `offset` is the hit position relative to the paddle center, in [-1, 1].
/// Speed is preserved; the ball always leaves upward.
pub fn reflect_off_paddle(velocity: Vec2, normal: Vec2, offset: f32, english_factor: f32) -> Vec2 {
    let speed = velocity.length();
    let reflected = reflect_velocity(velocity, normal);
    if speed < 1e-6 {
        return reflected;
    }

    let english = offset.clamp(-1.0, 1.0) * english_factor * speed;
    let steered = Vec2::new(reflected.x + english, reflected.y.abs());
    steered.normalize_or_zero() * speed
}

/// Check collision with the side walls and ceiling of the field
pub fn ball_wall_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    left: f32,
    right: f32,
    ceiling: f32,
) -> CollisionResult {
    if ball_pos.x - ball_radius < left {
        return CollisionResult {
            hit: true,
            point: Vec2::new(left, ball_pos.y),
            normal: Vec2::X,
            penetration: left - (ball_pos.x - ball_radius),
        };
    }
    if ball_pos.x + ball_radius > right {
        return CollisionResult {
            hit: true,
            point: Vec2::new(right, ball_pos.y),
            normal: Vec2::NEG_X,
            penetration: ball_pos.x + ball_radius - right,
        };
    }
    if ball_pos.y + ball_radius > ceiling {
        return CollisionResult {
            hit: true,
            point: Vec2::new(ball_pos.x, ceiling),
            normal: Vec2::NEG_Y,
            penetration: ball_pos.y + ball_radius - ceiling,
        };
    }

    CollisionResult::miss()
}
