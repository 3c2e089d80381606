/// Playback: turns core events into timed presentation frames.
///
/// The core resolves a turn instantly. Here the resulting events become a
/// queue of small changes to a `View` (dice face, token tile, flying marker,
/// message), each held for a fixed time before the next one applies:
///   DiceRolled     → "rolling..." message, spinning faces, final face
///   PlayerMoved    → one frame per tile walked
///   LadderClimbed  → arc jump from origin to destination
///   SnakeBitten    → same arc, different message and sound
///   PlayerWon      → win message and fanfare
///
/// Fast mode shortens spins, walks and jumps, and silences step ticks.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::TimingConfig;
use crate::domain::board::{tile_to_grid, Tile};
use crate::domain::player::Player;
use crate::sim::event::GameEvent;
use crate::sim::session::GameSession;
use super::sound::Sfx;

/// A token in mid-air, in fractional grid coordinates (row 0 at bottom).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Flyer {
    pub seat: usize,
    pub col: f32,
    pub row: f32,
}

/// What the renderer draws. Lags behind the session while frames play.
#[derive(Clone, Debug)]
pub struct View {
    pub tiles: Vec<Tile>,
    pub dice_face: u8,
    pub flyer: Option<Flyer>,
    pub message: String,
}

impl View {
    pub fn new(message: &str) -> Self {
        View {
            tiles: Vec::new(),
            dice_face: 1,
            flyer: None,
            message: message.to_string(),
        }
    }

    /// Snap to the session's current state.
    pub fn sync(&mut self, session: &GameSession) {
        self.tiles = session.player_list().iter().map(|p| p.tile).collect();
        self.dice_face = session.dice_value();
        self.flyer = None;
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Change {
    Dice(u8),
    Token { seat: usize, tile: Tile },
    Flyer(Option<Flyer>),
    Message(String),
}

#[derive(Clone, Debug)]
struct Frame {
    change: Change,
    sfx: Option<Sfx>,
    hold: Duration,
}

pub struct Playback {
    queue: VecDeque<Frame>,
    /// Earliest time the next frame may apply.
    next_at: Option<Instant>,
}

impl Playback {
    pub fn new() -> Self {
        Playback { queue: VecDeque::new(), next_at: None }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.next_at = None;
    }

    /// Nothing queued and the last frame's hold has elapsed.
    pub fn is_idle(&self, now: Instant) -> bool {
        self.queue.is_empty() && self.next_at.map_or(true, |t| now >= t)
    }

    /// Apply every frame that is due. Returns the sounds to play.
    pub fn tick(&mut self, now: Instant, view: &mut View) -> Vec<Sfx> {
        let mut sounds = Vec::new();
        loop {
            if let Some(t) = self.next_at {
                if now < t { break; }
            }
            let frame = match self.queue.pop_front() {
                Some(f) => f,
                None => {
                    self.next_at = None;
                    break;
                }
            };
            apply(view, frame.change);
            if let Some(sfx) = frame.sfx {
                sounds.push(sfx);
            }
            // Anchor to the previous deadline so long frames don't drift.
            let base = self.next_at.unwrap_or(now);
            self.next_at = Some(base + frame.hold);
            if frame.hold > Duration::ZERO && self.next_at.map_or(false, |t| t > now) {
                break;
            }
        }
        sounds
    }

    /// Queue frames for one turn's events.
    pub fn enqueue<R: Rng>(
        &mut self,
        events: &[GameEvent],
        players: &[Player],
        timing: &TimingConfig,
        fast: bool,
        rng: &mut R,
    ) {
        for event in events {
            match *event {
                GameEvent::DiceRolled { player, value } => {
                    self.push_dice(name(players, player), value, timing, fast, rng);
                }
                GameEvent::PlayerMoved { player, from, to } => {
                    self.push_walk(player, from, to, timing, fast);
                }
                GameEvent::LadderClimbed { player, from, to } => {
                    let msg = format!("{} climbs ladder to {}!", name(players, player), to);
                    self.push_jump(player, from, to, msg, Sfx::Ladder, timing, fast);
                }
                GameEvent::SnakeBitten { player, from, to } => {
                    let msg = format!("Oh no! {} bitten by snake to {}.", name(players, player), to);
                    self.push_jump(player, from, to, msg, Sfx::Snake, timing, fast);
                }
                GameEvent::PlayerWon { player } => {
                    self.push(
                        Change::Message(format!("{} wins!", name(players, player))),
                        Some(Sfx::Win),
                        Duration::from_millis(timing.message_hold_ms),
                    );
                }
                GameEvent::TurnAdvanced { .. } => {}
            }
        }
    }

    fn push(&mut self, change: Change, sfx: Option<Sfx>, hold: Duration) {
        self.queue.push_back(Frame { change, sfx, hold });
    }

    fn push_dice<R: Rng>(&mut self, who: &str, value: u8, timing: &TimingConfig, fast: bool, rng: &mut R) {
        let spins = if fast { timing.fast_dice_spin_frames } else { timing.dice_spin_frames };
        let spin_hold = Duration::from_millis(timing.dice_spin_ms);

        self.push(Change::Message(format!("{who} rolling...")), Some(Sfx::Dice), Duration::ZERO);
        for _ in 0..spins {
            self.push(Change::Dice(rng.gen_range(1..=6)), None, spin_hold);
        }
        self.push(Change::Dice(value), None, Duration::ZERO);
        self.push(Change::Message(format!("{who} rolled a {value}!")), None, spin_hold);
    }

    fn push_walk(&mut self, seat: usize, from: Tile, to: Tile, timing: &TimingConfig, fast: bool) {
        let hold = Duration::from_millis(if fast { timing.fast_step_ms } else { timing.step_ms });
        let sfx = if fast { None } else { Some(Sfx::Step) };
        for tile in walk(from, to) {
            self.push(Change::Token { seat, tile }, sfx, hold);
        }
    }

    fn push_jump(
        &mut self,
        seat: usize,
        from: Tile,
        to: Tile,
        message: String,
        sfx: Sfx,
        timing: &TimingConfig,
        fast: bool,
    ) {
        let frames = if fast { timing.fast_jump_frames } else { timing.jump_frames };
        let hold = Duration::from_millis(timing.jump_frame_ms);

        self.push(Change::Message(message), Some(sfx), Duration::ZERO);
        for i in 0..=frames {
            let t = i as f32 / frames as f32;
            self.push(Change::Flyer(Some(arc_point(seat, from, to, t))), None, hold);
        }
        self.push(Change::Flyer(None), None, Duration::ZERO);
        self.push(Change::Token { seat, tile: to }, None, Duration::ZERO);
    }
}

fn name(players: &[Player], seat: usize) -> &str {
    players.get(seat).map_or("?", |p| p.name.as_str())
}

fn apply(view: &mut View, change: Change) {
    match change {
        Change::Dice(face) => view.dice_face = face,
        Change::Token { seat, tile } => {
            if seat >= view.tiles.len() {
                view.tiles.resize(seat + 1, 1);
            }
            view.tiles[seat] = tile;
        }
        Change::Flyer(f) => view.flyer = f,
        Change::Message(m) => view.message = m,
    }
}

/// Tiles visited walking one square at a time, excluding the start.
/// The walk goes straight from `from` to `to`, so a bounced move steps
/// backwards without visiting 100.
fn walk(from: Tile, to: Tile) -> Vec<Tile> {
    let mut path = Vec::new();
    let mut t = from;
    while t != to {
        t = if t < to { t + 1 } else { t - 1 };
        path.push(t);
    }
    path
}

/// Point on a raised arc between two tiles, `t` in 0..=1.
fn arc_point(seat: usize, from: Tile, to: Tile, t: f32) -> Flyer {
    const ARC_ROWS: f32 = 1.5;
    let (c1, r1) = tile_to_grid(from);
    let (c2, r2) = tile_to_grid(to);
    let col = c1 as f32 + (c2 as f32 - c1 as f32) * t;
    let row = r1 as f32 + (r2 as f32 - r1 as f32) * t + ARC_ROWS * (std::f32::consts::PI * t).sin();
    Flyer { seat, col, row }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::player::default_roster;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn timing() -> TimingConfig {
        GameConfig::default().timing
    }

    /// Drain the whole queue, jumping the clock forward frame by frame.
    fn run_all(pb: &mut Playback, view: &mut View) -> Vec<Sfx> {
        let mut now = Instant::now();
        let mut sounds = vec![];
        for _ in 0..10_000 {
            sounds.extend(pb.tick(now, view));
            if pb.is_idle(now) { break; }
            now += Duration::from_millis(5);
        }
        sounds
    }

    #[test]
    fn walk_covers_every_tile() {
        assert_eq!(walk(10, 13), vec![11, 12, 13]);
        assert_eq!(walk(97, 95), vec![96, 95]);
        assert!(walk(5, 5).is_empty());
    }

    #[test]
    fn arc_starts_and_ends_on_tiles() {
        let start = arc_point(0, 28, 84, 0.0);
        let end = arc_point(0, 28, 84, 1.0);
        let (c1, r1) = tile_to_grid(28);
        let (c2, r2) = tile_to_grid(84);
        assert!((start.col - c1 as f32).abs() < 1e-4 && (start.row - r1 as f32).abs() < 1e-4);
        assert!((end.col - c2 as f32).abs() < 1e-4 && (end.row - r2 as f32).abs() < 1e-3);
        let mid = arc_point(0, 28, 84, 0.5);
        assert!(mid.row > (r1 + r2) as f32 / 2.0);
    }

    #[test]
    fn turn_plays_out_to_final_view() {
        let players = default_roster();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = Playback::new();
        let mut view = View::new("");
        view.tiles = vec![24, 1, 1, 1];

        let events = vec![
            GameEvent::DiceRolled { player: 0, value: 4 },
            GameEvent::PlayerMoved { player: 0, from: 24, to: 28 },
            GameEvent::LadderClimbed { player: 0, from: 28, to: 84 },
            GameEvent::TurnAdvanced { next: 1 },
        ];
        pb.enqueue(&events, &players, &timing(), false, &mut rng);
        let sounds = run_all(&mut pb, &mut view);

        assert_eq!(view.tiles[0], 84);
        assert_eq!(view.dice_face, 4);
        assert!(view.flyer.is_none());
        assert_eq!(view.message, "You climbs ladder to 84!");
        assert_eq!(sounds.first(), Some(&Sfx::Dice));
        assert_eq!(sounds.iter().filter(|s| **s == Sfx::Step).count(), 4);
        assert_eq!(sounds.last(), Some(&Sfx::Ladder));
    }

    #[test]
    fn fast_mode_is_shorter_and_quiet() {
        let players = default_roster();
        let events = vec![
            GameEvent::DiceRolled { player: 1, value: 6 },
            GameEvent::PlayerMoved { player: 1, from: 1, to: 7 },
        ];
        let mut rng = StdRng::seed_from_u64(2);

        let mut slow = Playback::new();
        slow.enqueue(&events, &players, &timing(), false, &mut rng);
        let mut fast = Playback::new();
        fast.enqueue(&events, &players, &timing(), true, &mut rng);
        assert!(fast.queue.len() < slow.queue.len());

        let total = |pb: &Playback| pb.queue.iter().map(|f| f.hold).sum::<Duration>();
        assert!(total(&fast) < total(&slow));

        let mut view = View::new("");
        let sounds = run_all(&mut fast, &mut view);
        assert_eq!(sounds, vec![Sfx::Dice]);
        assert_eq!(view.tiles[1], 7);
        assert_eq!(view.message, "Bot A rolled a 6!");
    }

    #[test]
    fn snake_and_win_messages() {
        let players = default_roster();
        let mut rng = StdRng::seed_from_u64(3);
        let mut pb = Playback::new();
        let mut view = View::new("");
        view.tiles = vec![1; 4];

        pb.enqueue(
            &[GameEvent::SnakeBitten { player: 2, from: 98, to: 78 }],
            &players, &timing(), true, &mut rng,
        );
        let sounds = run_all(&mut pb, &mut view);
        assert_eq!(sounds, vec![Sfx::Snake]);
        assert_eq!(view.tiles[2], 78);
        assert_eq!(view.message, "Oh no! Bot B bitten by snake to 78.");

        pb.enqueue(&[GameEvent::PlayerWon { player: 3 }], &players, &timing(), true, &mut rng);
        let sounds = run_all(&mut pb, &mut view);
        assert_eq!(sounds, vec![Sfx::Win]);
        assert_eq!(view.message, "Bot C wins!");
    }

    #[test]
    fn frames_wait_for_their_hold() {
        let players = default_roster();
        let mut rng = StdRng::seed_from_u64(4);
        let mut pb = Playback::new();
        let mut view = View::new("");
        view.tiles = vec![10, 1, 1, 1];
        pb.enqueue(
            &[GameEvent::PlayerMoved { player: 0, from: 10, to: 13 }],
            &players, &timing(), false, &mut rng,
        );

        let t0 = Instant::now();
        pb.tick(t0, &mut view);
        assert_eq!(view.tiles[0], 11);
        pb.tick(t0, &mut view);
        assert_eq!(view.tiles[0], 11, "second step must wait");
        assert!(!pb.is_idle(t0));

        let step = Duration::from_millis(timing().step_ms);
        pb.tick(t0 + step, &mut view);
        assert_eq!(view.tiles[0], 12);
        pb.tick(t0 + step * 2, &mut view);
        assert_eq!(view.tiles[0], 13);
        assert!(!pb.is_idle(t0 + step * 2));
        assert!(pb.is_idle(t0 + step * 3));
    }

    #[test]
    fn clear_drops_pending_frames() {
        let players = default_roster();
        let mut rng = StdRng::seed_from_u64(5);
        let mut pb = Playback::new();
        pb.enqueue(&[GameEvent::DiceRolled { player: 0, value: 2 }], &players, &timing(), false, &mut rng);
        pb.clear();
        assert!(pb.is_idle(Instant::now()));
    }
}
