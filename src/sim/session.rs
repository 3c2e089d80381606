/// GameSession: the single owned state container for one match.
///
/// Holds the roster (seat 0 is the human), the turn pointer, match status,
/// the last dice value for display, and two presentation flags that the core
/// stores but never reads (`fast_mode`, `show_numbers`).
///
/// All state changes go through `start_new_game()` and `request_turn()`.

use crate::domain::board::{ShortcutMap, CLASSIC_BOARD};
use crate::domain::dice::Dice;
use crate::domain::player::Player;
use super::event::GameEvent;
use super::turn::{self, TurnStage};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Finished { winner: usize },
}

pub struct GameSession {
    pub(super) board: ShortcutMap,
    pub(super) players: Vec<Player>,
    pub(super) turn_index: usize,
    pub(super) status: SessionStatus,
    pub(super) dice: Dice,
    pub(super) dice_value: u8,
    pub(super) stage: TurnStage,
    fast_mode: bool,
    show_numbers: bool,
}

// ── Construction / reset ──

impl GameSession {
    /// A session on the classic board. Status starts at `NotStarted`.
    pub fn new(players: Vec<Player>, dice: Dice) -> Self {
        Self::with_board(CLASSIC_BOARD, players, dice)
    }

    pub fn with_board(board: ShortcutMap, players: Vec<Player>, dice: Dice) -> Self {
        assert!(!players.is_empty(), "a session needs at least one player");
        debug_assert!(board.is_consistent(), "shortcut table violates its invariants");
        GameSession {
            board,
            players,
            turn_index: 0,
            status: SessionStatus::NotStarted,
            dice,
            dice_value: 1,
            stage: TurnStage::Idle,
            fast_mode: false,
            show_numbers: false,
        }
    }

    /// Reset every player and begin a match. Abandons anything in flight.
    pub fn start_new_game(&mut self) {
        for p in &mut self.players {
            p.reset();
        }
        self.turn_index = 0;
        self.dice_value = 1;
        self.stage = TurnStage::Idle;
        self.status = SessionStatus::InProgress;
        tracing::info!(players = self.players.len(), "new game");
    }

    #[allow(dead_code)]
    pub fn new_game(&mut self) {
        self.start_new_game();
    }
}

// ── Commands ──

impl GameSession {
    /// Play one full turn for the current player. Returns no events when the
    /// session is not accepting turns.
    pub fn request_turn(&mut self) -> Vec<GameEvent> {
        turn::take_turn(self)
    }

    #[allow(dead_code)]
    pub fn take_turn(&mut self) -> Vec<GameEvent> {
        self.request_turn()
    }

    /// Play one turn with a predetermined roll (replays, tests).
    #[allow(dead_code)]
    pub fn apply_roll(&mut self, steps: u8) -> Vec<GameEvent> {
        turn::apply_roll(self, steps)
    }

    pub fn set_fast_mode(&mut self, on: bool) {
        self.fast_mode = on;
    }

    pub fn toggle_board_numbering(&mut self, on: bool) {
        self.show_numbers = on;
    }
}

// ── Queries ──

impl GameSession {
    pub fn current_player(&self) -> &Player {
        &self.players[self.turn_index]
    }

    pub fn player_list(&self) -> &[Player] {
        &self.players
    }

    pub fn session_status(&self) -> SessionStatus {
        self.status
    }

    pub fn dice_value(&self) -> u8 {
        self.dice_value
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    #[allow(dead_code)]
    pub fn stage(&self) -> TurnStage {
        self.stage
    }

    pub fn board(&self) -> &ShortcutMap {
        &self.board
    }

    pub fn winner(&self) -> Option<&Player> {
        match self.status {
            SessionStatus::Finished { winner } => self.players.get(winner),
            _ => None,
        }
    }

    pub fn fast_mode(&self) -> bool {
        self.fast_mode
    }

    pub fn show_numbers(&self) -> bool {
        self.show_numbers
    }

    /// Would `request_turn()` do anything right now?
    pub fn accepts_turn(&self) -> bool {
        self.status == SessionStatus::InProgress && !self.current_player().won
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::FIRST_TILE;
    use crate::domain::player::default_roster;

    fn session() -> GameSession {
        GameSession::new(default_roster(), Dice::seeded(1))
    }

    #[test]
    fn fresh_session_is_not_started() {
        let mut s = session();
        assert_eq!(s.session_status(), SessionStatus::NotStarted);
        assert!(!s.accepts_turn());
        assert!(s.request_turn().is_empty());
        assert_eq!(s.dice_value(), 1);
    }

    #[test]
    fn new_game_resets_everything() {
        let mut s = session();
        s.start_new_game();
        s.players[2].tile = 64;
        s.players[3].tile = 100;
        s.players[3].won = true;
        s.turn_index = 3;
        s.dice_value = 6;
        s.status = SessionStatus::Finished { winner: 3 };

        s.new_game();
        assert_eq!(s.session_status(), SessionStatus::InProgress);
        assert_eq!(s.turn_index(), 0);
        assert_eq!(s.dice_value(), 1);
        assert_eq!(s.stage(), TurnStage::Idle);
        assert!(s.player_list().iter().all(|p| p.tile == FIRST_TILE && !p.won));
        assert!(s.winner().is_none());
    }

    #[test]
    fn current_player_follows_turn_index() {
        let mut s = session();
        s.start_new_game();
        assert!(s.current_player().is_human());
        s.turn_index = 2;
        assert_eq!(s.current_player().name, "Bot B");
    }

    #[test]
    fn display_flags_do_not_touch_state() {
        let mut s = session();
        s.start_new_game();
        s.set_fast_mode(true);
        s.toggle_board_numbering(true);
        assert!(s.fast_mode());
        assert!(s.show_numbers());
        assert_eq!(s.session_status(), SessionStatus::InProgress);
        assert_eq!(s.turn_index(), 0);
        s.set_fast_mode(false);
        assert!(!s.fast_mode());
    }

    #[test]
    #[should_panic]
    fn empty_roster_is_rejected() {
        let _ = GameSession::new(Vec::new(), Dice::seeded(0));
    }
}
