//! HUD adapters
//!
//! The game never draws text itself. `HudPresenter` decides what the HUD
//! should show each tick and forwards it to any `Hud` implementation.

use crate::consts::BANNER_SECS;
use crate::secs_to_ticks;
use crate::sim::{GameEvent, GamePhase, GameState};

/// Text surfaces a front end exposes
pub trait Hud {
    fn show_lives(&mut self, text: &str);
    fn hide_lives(&mut self);
    fn show_score(&mut self, text: &str);
    fn hide_score(&mut self);
    fn show_level(&mut self, text: &str);
    fn hide_level(&mut self);
    /// Large centered message
    fn show_banner(&mut self, text: &str);
    fn hide_banner(&mut self);
}

/// A text slot that can be hidden
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudText {
    pub text: String,
    pub visible: bool,
}

impl HudText {
    fn show(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
        }
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    /// Text when visible
    pub fn shown(&self) -> Option<&str> {
        self.visible.then_some(self.text.as_str())
    }
}

/// In-memory HUD, used headless and in tests
#[derive(Debug, Clone, Default)]
pub struct TextHud {
    pub lives: HudText,
    pub score: HudText,
    pub level: HudText,
    pub banner: HudText,
}

impl Hud for TextHud {
    fn show_lives(&mut self, text: &str) {
        self.lives.show(text);
    }
    fn hide_lives(&mut self) {
        self.lives.hide();
    }
    fn show_score(&mut self, text: &str) {
        self.score.show(text);
    }
    fn hide_score(&mut self) {
        self.score.hide();
    }
    fn show_level(&mut self, text: &str) {
        self.level.show(text);
    }
    fn hide_level(&mut self) {
        self.level.hide();
    }
    fn show_banner(&mut self, text: &str) {
        self.banner.show(text);
    }
    fn hide_banner(&mut self) {
        self.banner.hide();
    }
}

/// A banner message and how long it stays up
#[derive(Debug, Clone, PartialEq, Eq)]
struct Banner {
    text: String,
    /// None = until replaced
    ticks_left: Option<u32>,
}

/// Drives a `Hud` from game state and events
#[derive(Debug, Default)]
pub struct HudPresenter {
    banner: Option<Banner>,
}

impl HudPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn flash(&mut self, text: String) {
        self.banner = Some(Banner {
            text,
            ticks_left: Some(secs_to_ticks(BANNER_SECS)),
        });
    }

    fn pin(&mut self, text: &str) {
        self.banner = Some(Banner {
            text: text.to_string(),
            ticks_left: None,
        });
    }

    /// Current banner text, if any
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_ref().map(|b| b.text.as_str())
    }

    /// Called once per tick with that tick's events
    pub fn update(&mut self, hud: &mut dyn Hud, state: &GameState, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::LevelUp { level, bonus } => {
                    self.flash(format!("Level {level}!  Bonus {bonus}"))
                }
                GameEvent::GameOver { .. } => self.pin("Game Over"),
                GameEvent::PhaseChanged {
                    to: GamePhase::Paused,
                    ..
                } => self.pin("Paused"),
                GameEvent::PhaseChanged {
                    from: GamePhase::Paused,
                    ..
                } => self.banner = None,
                GameEvent::GameStarted => self.banner = None,
                _ => {}
            }
        }

        // Expire timed banners
        let expired = match &mut self.banner {
            Some(Banner {
                ticks_left: Some(ticks),
                ..
            }) => {
                if *ticks == 0 {
                    true
                } else {
                    *ticks -= 1;
                    false
                }
            }
            _ => false,
        };
        if expired {
            self.banner = None;
        }

        match state.phase {
            GamePhase::Default => {
                hud.hide_lives();
                hud.hide_score();
                hud.hide_level();
            }
            _ => {
                hud.show_lives(&state.lives.to_string());
                hud.show_score(&state.score.to_string());
                hud.show_level(&format!("Level {}", state.level));
            }
        }

        let countdown = (state.phase == GamePhase::Preparing && state.countdown_ticks > 0)
            .then(|| state.countdown_ticks.div_ceil(secs_to_ticks(1.0).max(1)));

        match (&self.banner, countdown) {
            (Some(banner), Some(secs)) => hud.show_banner(&format!("{}  {}", banner.text, secs)),
            (Some(banner), None) => hud.show_banner(&banner.text),
            (None, Some(secs)) => hud.show_banner(&secs.to_string()),
            (None, None) => hud.hide_banner(),
        }
    }
}
