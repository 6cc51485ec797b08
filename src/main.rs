//! Brickfall headless runner
//!
//! Plays matches without a front end: agents steer every paddle, results are
//! logged and human-side scores go to the leaderboard file.

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use brickfall::agent::{Agent, HeuristicAgent, RandomAgent};
use brickfall::consts::SIM_DT;
use brickfall::leaderboard::LeaderboardStore;
use brickfall::{GameConfig, GameMode, Match};

const DEFAULT_SEED: u64 = 0xB71C_4FA1_1000_0001;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Single,
    Double,
    Training,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => GameMode::Single,
            ModeArg::Double => GameMode::Double,
            ModeArg::Training => GameMode::Training,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentKind {
    Heuristic,
    Random,
}

#[derive(Parser, Debug)]
#[command(about = "Run Brickfall matches headless", version, author)]
struct Args {
    /// Game mode (defaults to the config file's mode).
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Matches to play, or episodes to collect in training.
    #[arg(long, default_value_t = 1)]
    episodes: usize,
    /// Base seed; match `n` uses `seed + n`.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// JSON config file.
    #[arg(long, default_value = "brickfall.json")]
    config: PathBuf,
    /// Leaderboard file (overrides the config).
    #[arg(long)]
    leaderboard: Option<PathBuf>,
    /// Player name recorded on the leaderboard (overrides the config).
    #[arg(long)]
    name: Option<String>,
    /// Controller for every paddle.
    #[arg(long, value_enum, default_value_t = AgentKind::Heuristic)]
    agent: AgentKind,
    /// Stop a match after this many simulation steps.
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut config = GameConfig::load(&args.config);
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(path) = &args.leaderboard {
        config.leaderboard_path = path.clone();
    }
    if let Some(name) = &args.name {
        config.player_name = name.clone();
    }
    config.validate()?;

    if config.is_training() {
        run_training(&config, &args)?;
    } else {
        run_matches(&config, &args)?;
    }
    Ok(())
}

fn create_agent(kind: AgentKind, seed: u64) -> Box<dyn Agent> {
    match kind {
        AgentKind::Heuristic => Box::new(HeuristicAgent::default()),
        AgentKind::Random => Box::new(RandomAgent::new(seed)),
    }
}

/// One training game, run until enough episodes have ended
fn run_training(config: &GameConfig, args: &Args) -> Result<(), Box<dyn Error>> {
    let mut m = Match::new(config, args.seed, create_agent(args.agent, args.seed), None);
    m.start();

    let mut ticks = 0u64;
    loop {
        let episodes = m.games()[0].driver().map_or(0, |d| d.episodes().len());
        if episodes >= args.episodes {
            break;
        }
        if ticks >= args.max_ticks {
            println!("Tick limit {} reached after {episodes} episodes.", args.max_ticks);
            break;
        }
        m.step()?;
        ticks += 1;
    }

    if let Some(driver) = m.games()[0].driver() {
        let summaries = driver.episodes();
        for (i, e) in summaries.iter().enumerate() {
            println!(
                "Episode {:>3}: score {:>6}  level {}  reward {:>8.3}  steps {}",
                i + 1,
                e.score,
                e.level,
                e.reward,
                e.steps
            );
        }
        if !summaries.is_empty() {
            let mean = summaries.iter().map(|e| e.reward).sum::<f32>() / summaries.len() as f32;
            println!("Mean reward over {} episodes: {mean:.3}", summaries.len());
        }
    }
    Ok(())
}

/// Single or Double matches, recording human-side scores
fn run_matches(config: &GameConfig, args: &Args) -> Result<(), Box<dyn Error>> {
    let mut store = Some(LeaderboardStore::open(config.leaderboard_path.clone())?);

    for n in 0..args.episodes {
        let seed = args.seed.wrapping_add(n as u64);
        let agent = create_agent(args.agent, seed);
        let autopilot = create_agent(args.agent, seed ^ 0x9E37_79B9);

        let mut m = Match::new(config, seed, agent, Some(autopilot));
        if let Some(store) = store.take() {
            m = m.with_leaderboard(store);
        }
        m.start();

        // Two fixed steps per 60 Hz frame
        let frame_dt = SIM_DT * 2.0;
        let mut ticks = 0u64;
        while !m.is_finished() && ticks < args.max_ticks {
            ticks += u64::from(m.update(frame_dt)?);
        }

        let outcome = m.outcome();
        let scores = outcome
            .scores
            .iter()
            .map(|(name, score)| format!("{name} {score}"))
            .collect::<Vec<_>>()
            .join(", ");
        match (&outcome.winner, m.is_finished()) {
            (_, false) => println!("Match {}: stopped after {ticks} ticks ({scores})", n + 1),
            (Some(winner), true) => println!("Match {}: {scores}; winner {winner}", n + 1),
            (None, true) => println!("Match {}: {scores}", n + 1),
        }

        store = m.take_leaderboard();
    }

    if let Some(store) = &store {
        println!("\nLeaderboard ({}):", store.path().display());
        for line in store.board().display_lines() {
            println!("  {line}");
        }
    }
    Ok(())
}
