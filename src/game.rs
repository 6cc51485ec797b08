//! Game host
//!
//! `Game` drives one field: it picks the paddle command (from input or an
//! agent), advances the simulation one fixed step, and forwards the step's
//! events to the HUD and the agent. `Match` owns the one or two games a
//! `GameMode` calls for, the fixed-timestep accumulator, and the leaderboard.

use crate::agent::{Agent, AgentDriver};
use crate::consts::*;
use crate::error::Result;
use crate::leaderboard::LeaderboardStore;
use crate::settings::{GameConfig, GameMode, PlayerType, ScreenPosition};
use crate::sim::{GameEvent, GamePhase, GameState, SessionRules, TickInput, tick};
use crate::ui::{HudPresenter, TextHud};

/// One game field and whoever controls it
pub struct Game {
    pub name: String,
    pub player: PlayerType,
    state: GameState,
    /// Paddle controller; None means input comes from `set_input`
    driver: Option<AgentDriver>,
    input: TickInput,
    presenter: HudPresenter,
    hud: TextHud,
}

impl Game {
    pub fn new(
        name: impl Into<String>,
        player: PlayerType,
        config: &GameConfig,
        screen: ScreenPosition,
        seed: u64,
    ) -> Self {
        let rules = SessionRules {
            training: config.is_training(),
            multi_level: config.multi_level,
            debug: config.debug,
            countdown_secs: config.effective_countdown_secs(),
            origin_x: screen.origin_x(),
            paddle_max_x: player.paddle_max_x(),
        };
        Self {
            name: name.into(),
            player,
            state: GameState::new(seed, rules),
            driver: None,
            input: TickInput::default(),
            presenter: HudPresenter::new(),
            hud: TextHud::default(),
        }
    }

    /// Hand the paddle to an agent
    pub fn with_agent(mut self, agent: Box<dyn Agent>) -> Self {
        log::info!("{}: paddle controlled by {} agent", self.name, agent.name());
        self.driver = Some(AgentDriver::new(agent));
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn hud(&self) -> &TextHud {
        &self.hud
    }

    pub fn driver(&self) -> Option<&AgentDriver> {
        self.driver.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == GamePhase::Gameover
    }

    /// Latch input for the next step. Pause and skip are consumed by one step.
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    pub fn start(&mut self) {
        self.state.start_game();
        self.flush_events();
    }

    /// End this game early (e.g. the opponent finished)
    pub fn end(&mut self) -> Vec<GameEvent> {
        self.state.end_game();
        self.flush_events()
    }

    /// Advance one fixed step and return what happened
    pub fn step(&mut self) -> Vec<GameEvent> {
        let mut input = self.input.clone();
        if let Some(driver) = &mut self.driver {
            if self.state.phase == GamePhase::Playing {
                input.horizontal = driver.action(&self.state);
            }
        }

        tick(&mut self.state, &input, SIM_DT);

        // One-shot inputs
        self.input.pause = false;
        self.input.skip_level = false;

        self.flush_events()
    }

    fn flush_events(&mut self) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        if let Some(driver) = &mut self.driver {
            driver.observe(&events);
        }
        self.presenter.update(&mut self.hud, &self.state, &events);
        events
    }
}

fn game_over_score(events: &[GameEvent]) -> Option<u64> {
    events.iter().find_map(|e| match e {
        GameEvent::GameOver { score, .. } => Some(*score),
        _ => None,
    })
}

/// Final standings of a match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// (game name, score) in game order
    pub scores: Vec<(String, u64)>,
    /// Highest scorer; None on a tie
    pub winner: Option<String>,
}

/// The games of one session plus shared bookkeeping
pub struct Match {
    pub mode: GameMode,
    games: Vec<Game>,
    player_name: String,
    leaderboard: Option<LeaderboardStore>,
    accumulator: f32,
}

impl Match {
    /// Build the games for `config.mode`.
    ///
    /// `agent` controls the agent side (Training, Double). `autopilot`, when
    /// given, steers the human side for headless runs.
    pub fn new(
        config: &GameConfig,
        seed: u64,
        agent: Box<dyn Agent>,
        autopilot: Option<Box<dyn Agent>>,
    ) -> Self {
        let mut games = Vec::new();
        let with_autopilot = |game: Game, autopilot: Option<Box<dyn Agent>>| match autopilot {
            Some(a) => game.with_agent(a),
            None => game,
        };

        match config.mode {
            GameMode::Training => {
                games.push(
                    Game::new("AgentGame", PlayerType::Agent, config, ScreenPosition::Center, seed)
                        .with_agent(agent),
                );
            }
            GameMode::Single => {
                let game =
                    Game::new("PlayerGame", PlayerType::Single, config, ScreenPosition::Center, seed);
                games.push(with_autopilot(game, autopilot));
            }
            GameMode::Double => {
                let game =
                    Game::new("PlayerGame", PlayerType::Player, config, ScreenPosition::Left, seed);
                games.push(with_autopilot(game, autopilot));
                // Both sides get the same serve sequence
                games.push(
                    Game::new("AgentGame", PlayerType::Agent, config, ScreenPosition::Right, seed)
                        .with_agent(agent),
                );
            }
        }

        log::info!(
            "{} match ({} model), {} game(s)",
            config.mode.as_str(),
            config.difficulty.model_path(),
            games.len()
        );

        Self {
            mode: config.mode,
            games,
            player_name: config.player_name.clone(),
            leaderboard: None,
            accumulator: 0.0,
        }
    }

    /// Record human scores to this store when their game ends
    pub fn with_leaderboard(mut self, store: LeaderboardStore) -> Self {
        self.leaderboard = Some(store);
        self
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, name: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.name == name)
    }

    pub fn leaderboard(&self) -> Option<&LeaderboardStore> {
        self.leaderboard.as_ref()
    }

    /// Detach the leaderboard, e.g. to hand it to the next match
    pub fn take_leaderboard(&mut self) -> Option<LeaderboardStore> {
        self.leaderboard.take()
    }

    pub fn start(&mut self) {
        for game in &mut self.games {
            game.start();
        }
    }

    /// Input for the human-controlled games
    pub fn set_player_input(&mut self, input: TickInput) {
        for game in self.games.iter_mut().filter(|g| g.player != PlayerType::Agent) {
            game.set_input(input.clone());
        }
    }

    /// Training never finishes; other modes finish when every game is over
    pub fn is_finished(&self) -> bool {
        self.mode != GameMode::Training && self.games.iter().all(Game::is_over)
    }

    /// Advance every game one fixed step.
    ///
    /// When any game ends the others are ended too, before scores are written.
    /// A failed write is returned after every score has been tried.
    pub fn step(&mut self) -> Result<()> {
        let mut results = Vec::new();
        for (i, game) in self.games.iter_mut().enumerate() {
            results.extend(game_over_score(&game.step()).map(|score| (i, score)));
        }

        if let Some(&(first, _)) = results.first() {
            // Opponents finish together
            for j in 0..self.games.len() {
                if !self.games[j].is_over() {
                    log::info!("{} finished, ending {}", self.games[first].name, self.games[j].name);
                    let events = self.games[j].end();
                    results.extend(game_over_score(&events).map(|score| (j, score)));
                }
            }
        }

        let mut outcome = Ok(());
        for (i, score) in results {
            if !self.games[i].player.records_scores() {
                continue;
            }
            if let Some(store) = &mut self.leaderboard {
                if let Err(e) = store.add_score(&self.player_name, score) {
                    log::warn!("Could not record score {}: {}", score, e);
                    if outcome.is_ok() {
                        outcome = Err(e);
                    }
                }
            }
        }
        outcome
    }

    /// Advance by a frame's worth of real time, in fixed steps.
    /// Returns the number of steps taken.
    pub fn update(&mut self, frame_dt: f32) -> Result<u32> {
        let dt = frame_dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step()?;
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop time we couldn't catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        Ok(substeps)
    }

    pub fn outcome(&self) -> MatchOutcome {
        let scores: Vec<(String, u64)> = self
            .games
            .iter()
            .map(|g| (g.name.clone(), g.state().score))
            .collect();

        let best = scores.iter().map(|(_, s)| *s).max();
        let leaders: Vec<&(String, u64)> =
            scores.iter().filter(|(_, s)| Some(*s) == best).collect();
        let winner = match leaders.as_slice() {
            [(name, _)] => Some(name.clone()),
            _ => None,
        };

        MatchOutcome { scores, winner }
    }
}
