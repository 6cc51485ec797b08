//! Game state and the session state machine
//!
//! `GameState` owns everything a single Breakout field needs. The per-tick
//! physics lives in `tick`; the transitions between phases live here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::collision::Aabb;
use super::levels::{LevelSetup, level_setup, level_tuning};
use crate::consts::*;
use crate::{secs_to_ticks, ticks_to_secs};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, not started yet
    Default,
    /// Level set up, ball and paddle frozen while the countdown runs
    Preparing,
    /// Active gameplay
    Playing,
    /// Gameplay suspended by the player
    Paused,
    /// Game finished
    Gameover,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Default => "Default",
            GamePhase::Preparing => "Preparing",
            GamePhase::Playing => "Playing",
            GamePhase::Paused => "Paused",
            GamePhase::Gameover => "Gameover",
        }
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// A new game (or training episode) began
    GameStarted,
    BrickDestroyed { id: u32, points: u32 },
    PaddleHit,
    BallLost { lives_left: u32 },
    /// The ball was in motion this tick
    BallMoving,
    LevelUp { level: u32, bonus: u32 },
    GameOver { score: u64, level: u32 },
    /// Training episode finished; the game restarts instead of ending
    EpisodeEnd { score: u64, level: u32 },
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Travel limit either side of the field origin
    pub max_x: f32,
    pub frozen: bool,
}

impl Paddle {
    pub fn new(max_x: f32) -> Self {
        Self {
            pos: Vec2::new(0.0, PADDLE_START_Y),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            max_x,
            frozen: true,
        }
    }

    pub fn rect(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(self.width, self.height))
    }

    pub fn left_edge(&self) -> f32 {
        self.pos.x - self.width / 2.0
    }

    pub fn right_edge(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Back to the start position
    pub fn reset(&mut self, origin_x: f32) {
        self.pos = Vec2::new(origin_x, PADDLE_START_Y);
    }

    /// Remove `percent` of the current width (0.1 = 10% narrower)
    pub fn shrink(&mut self, percent: f32) {
        self.width *= 1.0 - percent;
    }

    /// Move horizontally by `input` in [-1, 1].
    ///
    /// Movement toward a wall is ignored once the paddle has reached its
    /// travel limit.
    pub fn steer(&mut self, input: f32, origin_x: f32, dt: f32) {
        if self.frozen {
            return;
        }
        let input = input.clamp(-1.0, 1.0);
        let local_x = self.pos.x - origin_x;
        if (input > 0.0 && local_x < self.max_x) || (input < 0.0 && local_x > -self.max_x) {
            self.pos.x += input * PADDLE_SPEED * dt;
        }
    }
}

/// A brick on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub col: u8,
    /// Grid row, 0 = bottom (used for the color gradient)
    pub row: u8,
    pub rect: Aabb,
}

/// Per-game rules fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionRules {
    /// Game over restarts the game and ends the episode instead
    pub training: bool,
    /// Progress through all five levels
    pub multi_level: bool,
    /// Allow the skip-level input
    pub debug: bool,
    pub countdown_secs: f32,
    /// X of the field center
    pub origin_x: f32,
    pub paddle_max_x: f32,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            training: false,
            multi_level: true,
            debug: false,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            origin_x: 0.0,
            paddle_max_x: PADDLE_MAX_X,
        }
    }
}

/// Complete state of one game field
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rules: SessionRules,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    /// Current level, 1-based
    pub level: u32,
    pub bricks_remaining: u32,
    /// Points per destroyed brick at the current level
    pub brick_value: u32,
    /// Tick at which play started on the current level
    pub level_start_tick: u64,
    /// Simulation ticks elapsed outside Default/Paused/Gameover
    pub time_ticks: u64,
    /// Ticks left in the Preparing countdown
    pub countdown_ticks: u32,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Bricks still standing (sorted by id)
    pub bricks: Vec<Brick>,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a game in the Default phase
    pub fn new(seed: u64, rules: SessionRules) -> Self {
        let mut paddle = Paddle::new(rules.paddle_max_x);
        paddle.reset(rules.origin_x);
        Self {
            seed,
            rules,
            phase: GamePhase::Default,
            score: 0,
            lives: START_LIVES,
            level: 1,
            bricks_remaining: 0,
            brick_value: BASE_BRICK_VALUE,
            level_start_tick: 0,
            time_ticks: 0,
            countdown_ticks: 0,
            paddle,
            ball: Ball::default(),
            bricks: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        log::debug!("Phase {} -> {}", from.as_str(), to.as_str());
        self.push_event(GameEvent::PhaseChanged { from, to });
    }

    /// Seconds spent playing the current level
    pub fn level_elapsed_secs(&self) -> f32 {
        ticks_to_secs(self.time_ticks.saturating_sub(self.level_start_tick))
    }

    /// Reset score, lives and level, then prepare level 1
    pub fn start_game(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.level = 1;
        self.level_start_tick = self.time_ticks;

        let tuning = level_tuning(1);
        self.brick_value = tuning.brick_value();
        self.paddle.width = PADDLE_WIDTH;
        self.ball.max_velocity = BALL_MAX_VELOCITY;

        self.bricks.clear();
        self.setup_level();

        log::info!("Game started (seed {})", self.seed);
        self.push_event(GameEvent::GameStarted);
        self.prepare();
    }

    /// Lay out bricks for the current level
    fn setup_level(&mut self) {
        match level_setup(self.level) {
            Some(LevelSetup::Fresh(layout)) => {
                let first_id = self.next_id;
                self.bricks = layout.spawn(self.rules.origin_x, first_id);
                self.next_id = first_id + self.bricks.len() as u32;
            }
            Some(LevelSetup::Carry) | None => {}
        }
        self.bricks_remaining = self.bricks.len() as u32;
    }

    /// Reset and freeze paddle and ball, then count down to play
    pub fn prepare(&mut self) {
        self.set_phase(GamePhase::Preparing);
        self.paddle.reset(self.rules.origin_x);
        self.paddle.frozen = true;
        self.ball.freeze();
        let origin_x = self.rules.origin_x;
        self.ball.reset(origin_x, &mut self.rng);
        self.countdown_ticks = secs_to_ticks(self.rules.countdown_secs);
    }

    /// Release paddle and ball and start the level timer
    pub fn begin_play(&mut self) {
        self.paddle.frozen = false;
        self.ball.unfreeze();
        self.ball.vel = self.ball.serve_velocity();
        self.level_start_tick = self.time_ticks;
        self.set_phase(GamePhase::Playing);
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.set_phase(GamePhase::Paused),
            GamePhase::Paused => self.set_phase(GamePhase::Playing),
            _ => {}
        }
    }

    /// Remove a brick and credit its value
    pub fn score_brick(&mut self, index: usize) {
        let brick = self.bricks.remove(index);
        self.score += self.brick_value as u64;
        self.bricks_remaining = self.bricks_remaining.saturating_sub(1);
        self.push_event(GameEvent::BrickDestroyed {
            id: brick.id,
            points: self.brick_value,
        });
    }

    /// Take a life and re-serve the ball
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        log::debug!("Ball lost, {} lives left", self.lives);
        self.push_event(GameEvent::BallLost {
            lives_left: self.lives,
        });
        let origin_x = self.rules.origin_x;
        self.ball.reset(origin_x, &mut self.rng);
    }

    /// Whether the current level's clear condition is met
    pub fn level_cleared(&self) -> bool {
        if self.level == 1 && self.rules.multi_level {
            self.bricks_remaining <= LEVEL_ONE_CARRYOVER_BRICKS
        } else {
            self.bricks_remaining == 0
        }
    }

    /// Debug shortcut: meet the current level's clear condition without scoring.
    /// Level 1 keeps the bricks that carry over into level 2.
    pub fn skip_level(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        log::info!("Skipping level {}", self.level);
        let keep = if self.level == 1 && self.rules.multi_level {
            LEVEL_ONE_CARRYOVER_BRICKS as usize
        } else {
            0
        };
        let drop = self.bricks.len().saturating_sub(keep);
        self.bricks.drain(..drop);
        self.bricks_remaining = self.bricks.len() as u32;
        self.check_progress();
    }

    pub fn is_final_level(&self) -> bool {
        !self.rules.multi_level || self.level >= FINAL_LEVEL
    }

    /// Check lives and bricks after a tick of play and apply any transition
    pub fn check_progress(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        if self.lives == 0 {
            self.finish();
        } else if self.level_cleared() {
            if self.is_final_level() {
                self.finish();
            } else {
                self.advance_level();
            }
        }
    }

    /// Move to the next level: bonus, new brick value, smaller paddle, faster ball
    pub fn advance_level(&mut self) {
        let elapsed = self.level_elapsed_secs();
        self.level += 1;

        let tuning = level_tuning(self.level);
        let bonus = tuning.time_bonus(elapsed);
        self.score += bonus as u64;
        self.brick_value = tuning.brick_value();
        self.paddle.shrink(tuning.paddle_shrink);
        self.ball.speed_up(tuning.ball_speedup);

        if matches!(level_setup(self.level), Some(LevelSetup::Fresh(_))) {
            self.bricks.clear();
        }
        self.setup_level();

        log::info!(
            "Level {} reached after {:.1}s, bonus {}, {} bricks",
            self.level,
            elapsed,
            bonus,
            self.bricks_remaining
        );
        self.push_event(GameEvent::LevelUp {
            level: self.level,
            bonus,
        });
        self.prepare();
    }

    /// End of play: training restarts, otherwise the game is over
    fn finish(&mut self) {
        if self.rules.training {
            self.end_episode();
        } else {
            self.end_game();
        }
    }

    /// Enter Gameover and freeze everything. Has no effect once over.
    pub fn end_game(&mut self) {
        if self.phase == GamePhase::Gameover {
            return;
        }
        self.set_phase(GamePhase::Gameover);
        let origin_x = self.rules.origin_x;
        self.ball.reset(origin_x, &mut self.rng);
        self.ball.freeze();
        self.paddle.frozen = true;

        log::info!("Game over: score {} at level {}", self.score, self.level);
        self.push_event(GameEvent::GameOver {
            score: self.score,
            level: self.level,
        });
    }

    /// Close a training episode and start the next one
    pub fn end_episode(&mut self) {
        log::debug!("Episode ended: score {} at level {}", self.score, self.level);
        self.push_event(GameEvent::EpisodeEnd {
            score: self.score,
            level: self.level,
        });
        self.start_game();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> SessionRules {
        SessionRules {
            countdown_secs: 0.0,
            ..Default::default()
        }
    }

    fn playing(rules: SessionRules) -> GameState {
        let mut state = GameState::new(42, rules);
        state.start_game();
        state.begin_play();
        state.drain_events();
        state
    }

    #[test]
    fn test_new_game_is_default() {
        let state = GameState::new(1, rules());
        assert_eq!(state.phase, GamePhase::Default);
        assert!(state.bricks.is_empty());
    }

    #[test]
    fn test_start_game_prepares_level_one() {
        let mut state = GameState::new(1, rules());
        state.start_game();
        assert_eq!(state.phase, GamePhase::Preparing);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.bricks_remaining, 54);
        assert!(state.ball.frozen && state.paddle.frozen);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::GameStarted));
    }

    #[test]
    fn test_paddle_steer_respects_limit() {
        let mut paddle = Paddle::new(4.5);
        paddle.reset(0.0);
        paddle.frozen = false;
        for _ in 0..1000 {
            paddle.steer(1.0, 0.0, SIM_DT);
        }
        // Stops within one step of the limit
        assert!(paddle.pos.x >= 4.5 && paddle.pos.x < 4.5 + PADDLE_SPEED * SIM_DT + 1e-4);
        let x = paddle.pos.x;
        paddle.steer(1.0, 0.0, SIM_DT);
        assert_eq!(paddle.pos.x, x);
        paddle.steer(-1.0, 0.0, SIM_DT);
        assert!(paddle.pos.x < x);
    }

    #[test]
    fn test_frozen_paddle_ignores_input() {
        let mut paddle = Paddle::new(6.0);
        paddle.steer(1.0, 0.0, SIM_DT);
        assert_eq!(paddle.pos.x, 0.0);
    }

    #[test]
    fn test_level_one_advances_at_carryover() {
        let mut state = playing(rules());
        while state.bricks_remaining > LEVEL_ONE_CARRYOVER_BRICKS {
            state.score_brick(0);
            state.check_progress();
        }
        assert_eq!(state.level, 2);
        // Survivors carry into level 2
        assert_eq!(state.bricks.len() as u32, LEVEL_ONE_CARRYOVER_BRICKS);
        assert_eq!(state.brick_value, 20);
        assert_eq!(state.phase, GamePhase::Preparing);
    }

    #[test]
    fn test_clearing_level_gives_one_level_and_one_bonus() {
        let mut state = playing(rules());
        state.level = 3;
        state.brick_value = level_tuning(3).brick_value();
        state.bricks_remaining = 1;
        state.bricks.truncate(1);
        let width = state.paddle.width;
        let max_velocity = state.ball.max_velocity;
        let score_before = state.score;

        state.score_brick(0);
        state.check_progress();
        // Already Preparing; a second check is a no-op
        state.check_progress();

        assert_eq!(state.level, 4);
        assert_eq!(state.bricks_remaining, 18);
        assert!(state.paddle.width < width);
        assert!(state.ball.max_velocity > max_velocity);

        let events = state.drain_events();
        let level_ups: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::LevelUp { level, bonus } => Some((*level, *bonus)),
                _ => None,
            })
            .collect();
        assert_eq!(level_ups.len(), 1);
        let (level, bonus) = level_ups[0];
        assert_eq!(level, 4);
        assert_eq!(state.score, score_before + state_brick_points(3) + bonus as u64);
    }

    fn state_brick_points(level: u32) -> u64 {
        level_tuning(level).brick_value() as u64
    }

    #[test]
    fn test_final_level_clear_ends_game() {
        let mut state = playing(rules());
        state.level = FINAL_LEVEL;
        state.bricks.truncate(1);
        state.bricks_remaining = 1;
        state.score_brick(0);
        state.check_progress();
        assert_eq!(state.phase, GamePhase::Gameover);
        assert_eq!(state.level, FINAL_LEVEL);
    }

    #[test]
    fn test_single_level_needs_full_clear() {
        let mut state = playing(SessionRules {
            multi_level: false,
            ..rules()
        });
        while state.bricks_remaining > 1 {
            state.score_brick(0);
            state.check_progress();
            assert_eq!(state.phase, GamePhase::Playing);
        }
        state.score_brick(0);
        state.check_progress();
        assert_eq!(state.phase, GamePhase::Gameover);
        assert_eq!(state.score, 54 * 10);
    }

    #[test]
    fn test_game_over_only_once() {
        let mut state = playing(rules());
        for _ in 0..START_LIVES {
            state.lose_life();
            state.check_progress();
        }
        assert_eq!(state.phase, GamePhase::Gameover);
        state.end_game();
        state.check_progress();
        let overs = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
        assert!(state.ball.frozen && state.paddle.frozen);
    }

    #[test]
    fn test_training_restarts_instead_of_ending() {
        let mut state = playing(SessionRules {
            training: true,
            ..rules()
        });
        state.score = 120;
        for _ in 0..START_LIVES {
            state.lose_life();
            state.check_progress();
        }
        assert_eq!(state.phase, GamePhase::Preparing);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.score, 0);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::EpisodeEnd {
            score: 120,
            level: 1
        }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_pause_toggles_only_from_play() {
        let mut state = GameState::new(3, rules());
        state.start_game();
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Preparing);
        state.begin_play();
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Paused);
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Playing);
    }
}
