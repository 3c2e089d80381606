/// Dice and the bot "loaded dice" heuristic.
///
/// Humans always get a fair roll. Bots draw a fair roll first, then with
/// probability `smart_roll` throw it away and pick the face that scores best
/// for their current tile:
///   - landing on a ladder origin:  +50 + climb length
///   - landing on a snake origin:   -60 - drop length
///   - progress:                    +0.1 per tile gained (negative on bounce)
///   - landing on the last tile:    +1000
/// Faces are scored 1→6 and only a strictly better score replaces the best,
/// so ties go to the lowest face.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::board::{move_target, Shortcut, ShortcutMap, Tile, WIN_TILE};
use super::player::{Controller, Player};

pub const FACES: u8 = 6;

/// Seedable die. The only source of randomness the game rules consume.
pub struct Dice {
    rng: StdRng,
}

impl Dice {
    pub fn seeded(seed: u64) -> Self {
        Dice { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Dice { rng: StdRng::from_entropy() }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Dice::seeded(s),
            None => Dice::from_entropy(),
        }
    }

    /// Uniform 1..=6.
    pub fn roll_fair(&mut self) -> u8 {
        self.rng.gen_range(1..=FACES)
    }

    /// Roll on behalf of `player`, applying the bot heuristic when it fires.
    pub fn roll_for(&mut self, player: &Player, board: &ShortcutMap) -> u8 {
        let base = self.roll_fair();
        let difficulty = match player.controller {
            Controller::Human => return base,
            Controller::Bot(d) => d,
        };
        self.roll_with_chance(base, difficulty.profile().smart_roll, player.tile, board)
    }

    fn roll_with_chance(&mut self, base: u8, smart_roll: f64, tile: Tile, board: &ShortcutMap) -> u8 {
        let u: f64 = self.rng.gen();
        if u < smart_roll {
            let steered = steer(board, tile);
            tracing::trace!(tile, base, steered, "bot steered roll");
            steered
        } else {
            base
        }
    }
}

/// Score of landing where `candidate` would take a token from `from`.
pub fn steer_score(board: &ShortcutMap, from: Tile, candidate: u8) -> f64 {
    let p = move_target(from, candidate);
    let mut score = 0.0;
    match board.shortcut_at(p) {
        Some(Shortcut::Ladder { to }) => score += 50.0 + (to - p) as f64,
        Some(Shortcut::Snake { to }) => score -= 60.0 + (p - to) as f64,
        None => {}
    }
    score += (p as f64 - from as f64) * 0.1;
    if p == WIN_TILE {
        score += 1000.0;
    }
    score
}

/// Best face for a token on `from`.
pub fn steer(board: &ShortcutMap, from: Tile) -> u8 {
    best_face((1..=FACES).map(|candidate| steer_score(board, from, candidate)))
}

/// Face (1-based) of the first strictly highest score.
fn best_face(scores: impl Iterator<Item = f64>) -> u8 {
    let mut best = 1;
    let mut best_score = f64::NEG_INFINITY;
    for (face, score) in (1..=FACES).zip(scores) {
        if score > best_score {
            best_score = score;
            best = face;
        }
    }
    best
}
