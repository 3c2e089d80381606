/// Participants and bot difficulty tiers.

use std::time::Duration;

use rand::Rng;

use super::board::{Tile, FIRST_TILE};

/// Bot difficulty tier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Difficulty {
    Chill,
    #[default]
    Balanced,
    Spicy,
}

/// Per-tier tuning. `smart_roll` is the chance a bot steers its roll;
/// `think_delay` is a cosmetic pause range in seconds.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DifficultyProfile {
    pub smart_roll: f64,
    pub think_delay: (f64, f64),
}

const CHILL: DifficultyProfile = DifficultyProfile { smart_roll: 0.0, think_delay: (0.5, 0.9) };
const BALANCED: DifficultyProfile = DifficultyProfile { smart_roll: 0.35, think_delay: (0.7, 1.2) };
const SPICY: DifficultyProfile = DifficultyProfile { smart_roll: 0.7, think_delay: (0.9, 1.4) };

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Chill, Difficulty::Balanced, Difficulty::Spicy];

    /// Parse a tier name, case-insensitive.
    pub fn from_name(s: &str) -> Option<Difficulty> {
        Self::ALL.into_iter().find(|d| d.name().eq_ignore_ascii_case(s.trim()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Chill => "Chill",
            Difficulty::Balanced => "Balanced",
            Difficulty::Spicy => "Spicy",
        }
    }

    pub fn profile(self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Chill => &CHILL,
            Difficulty::Balanced => &BALANCED,
            Difficulty::Spicy => &SPICY,
        }
    }
}

impl DifficultyProfile {
    /// Sample a bot "thinking" pause. Presentation only.
    pub fn think_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let (lo, hi) = self.think_delay;
        let secs = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        Duration::from_secs_f64(secs.max(0.0))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Controller {
    Human,
    Bot(Difficulty),
}

#[derive(Clone, Debug)]
pub struct Player {
    pub name: String,
    pub controller: Controller,
    pub tile: Tile,
    /// Set once on reaching the last tile; stays set until the next game.
    pub won: bool,
}

impl Player {
    pub fn human(name: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            controller: Controller::Human,
            tile: FIRST_TILE,
            won: false,
        }
    }

    pub fn bot(name: impl Into<String>, difficulty: Difficulty) -> Self {
        Player {
            name: name.into(),
            controller: Controller::Bot(difficulty),
            tile: FIRST_TILE,
            won: false,
        }
    }

    pub fn reset(&mut self) {
        self.tile = FIRST_TILE;
        self.won = false;
    }

    pub fn is_human(&self) -> bool {
        self.controller == Controller::Human
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        match self.controller {
            Controller::Human => None,
            Controller::Bot(d) => Some(d),
        }
    }
}

/// One human followed by the three stock bots.
pub fn default_roster() -> Vec<Player> {
    vec![
        Player::human("You"),
        Player::bot("Bot A", Difficulty::Chill),
        Player::bot("Bot B", Difficulty::Balanced),
        Player::bot("Bot C", Difficulty::Spicy),
    ]
}
