//! Fixed timestep simulation tick
//!
//! Core game loop that advances one field deterministically.

use super::collision::{ball_box_collision, ball_wall_collision, reflect_off_paddle, reflect_velocity};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal paddle command in [-1, 1]
    pub horizontal: f32,
    /// Pause toggle
    pub pause: bool,
    /// Clear the current level (debug only)
    pub skip_level: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
        if state.phase == GamePhase::Paused {
            return;
        }
    }

    match state.phase {
        GamePhase::Default | GamePhase::Paused | GamePhase::Gameover => return,
        _ => {}
    }

    state.time_ticks += 1;

    match state.phase {
        GamePhase::Preparing => {
            if state.countdown_ticks == 0 {
                state.begin_play();
            } else {
                state.countdown_ticks -= 1;
            }
        }

        GamePhase::Playing => {
            if input.skip_level && state.rules.debug {
                state.skip_level();
                return;
            }

            let origin_x = state.rules.origin_x;
            state.paddle.steer(input.horizontal, origin_x, dt);

            step_ball(state, dt);

            if state.ball.is_lost() {
                state.lose_life();
            }
            if state.ball.is_moving() {
                state.push_event(GameEvent::BallMoving);
            }

            state.check_progress();
        }

        _ => {}
    }
}

/// Regulate, integrate and collide the ball
fn step_ball(state: &mut GameState, dt: f32) {
    state.ball.regulate();
    state.ball.pos += state.ball.vel * dt;

    let origin_x = state.rules.origin_x;
    let radius = state.ball.radius;

    // Walls and ceiling
    let wall = ball_wall_collision(
        state.ball.pos,
        radius,
        origin_x - FIELD_HALF_WIDTH,
        origin_x + FIELD_HALF_WIDTH,
        CEILING_Y,
    );
    if wall.hit {
        state.ball.pos += wall.normal * wall.penetration;
        if state.ball.vel.dot(wall.normal) < 0.0 {
            state.ball.vel = reflect_velocity(state.ball.vel, wall.normal);
        }
    }

    // Paddle: only a ball travelling downward bounces
    let paddle_rect = state.paddle.rect();
    let hit = ball_box_collision(state.ball.pos, radius, &paddle_rect);
    if hit.hit && state.ball.vel.y < 0.0 {
        let offset = (state.ball.pos.x - state.paddle.pos.x) / paddle_rect.half.x.max(1e-3);
        state.ball.pos += hit.normal * hit.penetration;
        state.ball.vel = reflect_off_paddle(state.ball.vel, hit.normal, offset, PADDLE_ENGLISH);
        state.push_event(GameEvent::PaddleHit);
    }

    // Bricks: at most one per tick
    let struck = state.bricks.iter().enumerate().find_map(|(i, brick)| {
        let result = ball_box_collision(state.ball.pos, radius, &brick.rect);
        result.hit.then_some((i, result))
    });
    if let Some((index, hit)) = struck {
        state.ball.pos += hit.normal * hit.penetration;
        if state.ball.vel.dot(hit.normal) < 0.0 {
            state.ball.vel = reflect_velocity(state.ball.vel, hit.normal);
        }
        state.score_brick(index);
    }
}
