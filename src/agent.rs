//! Agent boundary
//!
//! The paddle can be handed to an externally trained policy. This module only
//! wires the game to it: a fixed observation vector in, a single continuous
//! action out, and shaped rewards for discrete game events.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{GameEvent, GameState};

/// Reward for destroying a brick
pub const REWARD_BRICK_DESTROYED: f32 = 1.0;
/// Reward for losing the ball
pub const REWARD_BALL_LOST: f32 = -5.0;
/// Reward per tick while the ball is in motion
pub const REWARD_BALL_MOVING: f32 = 0.001;
/// Reward for returning the ball with the paddle
pub const REWARD_PADDLE_HIT: f32 = 0.1;

/// Number of floats in an observation
pub const OBSERVATION_SIZE: usize = 6;

/// What the agent sees each step, in field-local coordinates:
/// `[paddle_left_x, paddle_right_x, ball_x, ball_y, ball_vx, ball_vy]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation(pub [f32; OBSERVATION_SIZE]);

impl Observation {
    pub fn from_state(state: &GameState) -> Self {
        let origin_x = state.rules.origin_x;
        let ball = &state.ball;
        Self([
            state.paddle.left_edge() - origin_x,
            state.paddle.right_edge() - origin_x,
            ball.pos.x - origin_x,
            ball.pos.y,
            ball.vel.x,
            ball.vel.y,
        ])
    }

    pub fn paddle_center(&self) -> f32 {
        (self.0[0] + self.0[1]) * 0.5
    }

    pub fn ball_x(&self) -> f32 {
        self.0[2]
    }

    pub fn ball_y(&self) -> f32 {
        self.0[3]
    }

    pub fn ball_vx(&self) -> f32 {
        self.0[4]
    }

    pub fn ball_vy(&self) -> f32 {
        self.0[5]
    }
}

/// Shaped reward for a game event, if it carries one
pub fn reward_for(event: &GameEvent) -> Option<f32> {
    match event {
        GameEvent::BrickDestroyed { .. } => Some(REWARD_BRICK_DESTROYED),
        GameEvent::BallLost { .. } => Some(REWARD_BALL_LOST),
        GameEvent::BallMoving => Some(REWARD_BALL_MOVING),
        GameEvent::PaddleHit => Some(REWARD_PADDLE_HIT),
        _ => None,
    }
}

/// A paddle controller the game loop invokes each tick
pub trait Agent {
    fn name(&self) -> &str;

    /// Horizontal command for this step; values outside [-1, 1] are clamped
    fn act(&mut self, observation: &Observation) -> f32;

    fn add_reward(&mut self, _reward: f32) {}

    fn on_episode_begin(&mut self) {}

    fn end_episode(&mut self) {}
}

/// Follows the ball, leading it slightly in its direction of travel.
/// Stands in for manual control when no trained model is attached.
#[derive(Debug, Clone)]
pub struct HeuristicAgent {
    /// Seconds of ball travel to anticipate
    pub lead: f32,
    /// Distance at which the command saturates
    pub reach: f32,
}

impl Default for HeuristicAgent {
    fn default() -> Self {
        Self {
            lead: 0.15,
            reach: 0.3,
        }
    }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn act(&mut self, observation: &Observation) -> f32 {
        let target = observation.ball_x() + observation.ball_vx() * self.lead;
        let delta = target - observation.paddle_center();
        (delta / self.reach.max(1e-3)).clamp(-1.0, 1.0)
    }
}

/// Uniformly random commands
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: Pcg32,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, _observation: &Observation) -> f32 {
        self.rng.random_range(-1.0..=1.0)
    }
}

/// Totals for one finished episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub score: u64,
    pub level: u32,
    pub reward: f32,
    pub steps: u64,
}

/// Feeds an agent observations and rewards from one game field
pub struct AgentDriver {
    agent: Box<dyn Agent>,
    episode_reward: f32,
    episode_steps: u64,
    episodes: Vec<EpisodeSummary>,
}

impl AgentDriver {
    pub fn new(agent: Box<dyn Agent>) -> Self {
        Self {
            agent,
            episode_reward: 0.0,
            episode_steps: 0,
            episodes: Vec::new(),
        }
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    /// Ask the agent for this tick's paddle command
    pub fn action(&mut self, state: &GameState) -> f32 {
        let observation = Observation::from_state(state);
        self.episode_steps += 1;
        let action = self.agent.act(&observation);
        if action.is_finite() {
            action.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Translate game events into rewards and episode boundaries
    pub fn observe(&mut self, events: &[GameEvent]) {
        for event in events {
            if let Some(reward) = reward_for(event) {
                self.episode_reward += reward;
                self.agent.add_reward(reward);
            }
            match event {
                GameEvent::GameStarted => self.agent.on_episode_begin(),
                GameEvent::EpisodeEnd { score, level } | GameEvent::GameOver { score, level } => {
                    self.finish_episode(*score, *level)
                }
                _ => {}
            }
        }
    }

    fn finish_episode(&mut self, score: u64, level: u32) {
        let summary = EpisodeSummary {
            score,
            level,
            reward: self.episode_reward,
            steps: self.episode_steps,
        };
        log::info!(
            "Episode {} ({}): score {}, level {}, reward {:.3}, {} steps",
            self.episodes.len() + 1,
            self.agent.name(),
            summary.score,
            summary.level,
            summary.reward,
            summary.steps
        );
        self.agent.end_episode();
        self.episodes.push(summary);
        self.episode_reward = 0.0;
        self.episode_steps = 0;
    }

    pub fn episodes(&self) -> &[EpisodeSummary] {
        &self.episodes
    }

    /// Reward accumulated in the episode still running
    pub fn episode_reward(&self) -> f32 {
        self.episode_reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SessionRules;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every callback it receives
    #[derive(Default)]
    struct Log {
        rewards: Vec<f32>,
        begins: u32,
        ends: u32,
    }

    struct Recorder {
        log: Rc<RefCell<Log>>,
        action: f32,
    }

    impl Agent for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn act(&mut self, _observation: &Observation) -> f32 {
            self.action
        }
        fn add_reward(&mut self, reward: f32) {
            self.log.borrow_mut().rewards.push(reward);
        }
        fn on_episode_begin(&mut self) {
            self.log.borrow_mut().begins += 1;
        }
        fn end_episode(&mut self) {
            self.log.borrow_mut().ends += 1;
        }
    }

    #[test]
    fn test_reward_table() {
        assert_eq!(reward_for(&GameEvent::BrickDestroyed { id: 1, points: 10 }), Some(1.0));
        assert_eq!(reward_for(&GameEvent::BallLost { lives_left: 2 }), Some(-5.0));
        assert_eq!(reward_for(&GameEvent::BallMoving), Some(0.001));
        assert_eq!(reward_for(&GameEvent::PaddleHit), Some(0.1));
        assert_eq!(reward_for(&GameEvent::LevelUp { level: 2, bonus: 5 }), None);
    }

    #[test]
    fn test_observation_is_field_local() {
        let mut state = GameState::new(
            9,
            SessionRules {
                origin_x: 4.0,
                ..Default::default()
            },
        );
        state.ball.pos = Vec2::new(5.0, 1.0);
        state.ball.vel = Vec2::new(2.0, -3.0);
        let obs = Observation::from_state(&state);
        assert_eq!(obs.0, [-0.75, 0.75, 1.0, 1.0, 2.0, -3.0]);
        assert_eq!(obs.paddle_center(), 0.0);
    }

    #[test]
    fn test_driver_clamps_actions() {
        let log = Rc::new(RefCell::new(Log::default()));
        let state = GameState::new(1, SessionRules::default());

        let mut driver = AgentDriver::new(Box::new(Recorder {
            log: log.clone(),
            action: 3.0,
        }));
        assert_eq!(driver.action(&state), 1.0);

        let mut driver = AgentDriver::new(Box::new(Recorder {
            log,
            action: f32::NAN,
        }));
        assert_eq!(driver.action(&state), 0.0);
    }

    #[test]
    fn test_driver_forwards_rewards_and_episodes() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut driver = AgentDriver::new(Box::new(Recorder {
            log: log.clone(),
            action: 0.0,
        }));

        driver.observe(&[
            GameEvent::GameStarted,
            GameEvent::BrickDestroyed { id: 1, points: 10 },
            GameEvent::PaddleHit,
            GameEvent::BallLost { lives_left: 0 },
            GameEvent::EpisodeEnd { score: 10, level: 1 },
        ]);

        let log = log.borrow();
        assert_eq!(log.rewards, vec![1.0, 0.1, -5.0]);
        assert_eq!(log.begins, 1);
        assert_eq!(log.ends, 1);

        let summary = &driver.episodes()[0];
        assert_eq!(summary.score, 10);
        assert!((summary.reward - (-3.9)).abs() < 1e-5);
        assert_eq!(driver.episode_reward(), 0.0);
    }

    #[test]
    fn test_heuristic_moves_toward_ball() {
        let mut agent = HeuristicAgent::default();
        let left = Observation([-0.75, 0.75, -3.0, 0.0, 0.0, -3.0]);
        let right = Observation([-0.75, 0.75, 3.0, 0.0, 0.0, -3.0]);
        let centered = Observation([-0.75, 0.75, 0.0, 0.0, 0.0, -3.0]);
        assert_eq!(agent.act(&left), -1.0);
        assert_eq!(agent.act(&right), 1.0);
        assert_eq!(agent.act(&centered), 0.0);
    }

    #[test]
    fn test_random_agent_in_range_and_seeded() {
        let obs = Observation([0.0; OBSERVATION_SIZE]);
        let mut a = RandomAgent::new(5);
        let mut b = RandomAgent::new(5);
        for _ in 0..100 {
            let x = a.act(&obs);
            assert!((-1.0..=1.0).contains(&x));
            assert_eq!(x, b.act(&obs));
        }
    }
}
