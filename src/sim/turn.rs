/// The turn engine: resolves one player's turn in a single call.
///
/// Stage order:
///   1. Rolling:           dice (or a forced roll) decide the steps
///   2. Moving:            advance, bouncing off the last tile on overshoot
///   3. ResolvingShortcut: at most one ladder or snake hop
///   4. CheckingWin:       on the last tile the match finishes
///   5. AdvancingTurn:     pointer moves to the next seat
///
/// A turn always runs to completion; no other player's state changes while
/// it runs. The session's `stage` is back at `Idle` when this returns.

use crate::domain::board::{move_target, Shortcut, WIN_TILE};
use crate::domain::dice::FACES;
use super::event::GameEvent;
use super::session::{GameSession, SessionStatus};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnStage {
    Idle,
    Rolling,
    Moving,
    ResolvingShortcut,
    CheckingWin,
    AdvancingTurn,
}

/// Full turn for the current player, dice included.
pub fn take_turn(session: &mut GameSession) -> Vec<GameEvent> {
    run(session, None)
}

/// Full turn with the roll fixed to `steps`. Out-of-range rolls are clamped
/// to a die face.
pub fn apply_roll(session: &mut GameSession, steps: u8) -> Vec<GameEvent> {
    let face = steps.clamp(1, FACES);
    if face != steps {
        tracing::warn!(steps, face, "forced roll outside 1..=6, clamped");
    }
    run(session, Some(face))
}

fn run(session: &mut GameSession, forced: Option<u8>) -> Vec<GameEvent> {
    if !session.accepts_turn() {
        tracing::debug!(status = ?session.status, seat = session.turn_index, "turn request ignored");
        return vec![];
    }

    let seat = session.turn_index;
    let mut events: Vec<GameEvent> = Vec::new();
    let mut steps = 0;
    let mut stage = TurnStage::Rolling;

    while stage != TurnStage::Idle {
        session.stage = stage;
        stage = match stage {
            TurnStage::Rolling => {
                steps = match forced {
                    Some(s) => s,
                    None => session.dice.roll_for(&session.players[seat], &session.board),
                };
                session.dice_value = steps;
                events.push(GameEvent::DiceRolled { player: seat, value: steps });
                TurnStage::Moving
            }
            TurnStage::Moving => {
                let player = &mut session.players[seat];
                let from = player.tile;
                let to = move_target(from, steps);
                player.tile = to;
                events.push(GameEvent::PlayerMoved { player: seat, from, to });
                TurnStage::ResolvingShortcut
            }
            TurnStage::ResolvingShortcut => {
                let from = session.players[seat].tile;
                match session.board.shortcut_at(from) {
                    Some(Shortcut::Ladder { to }) => {
                        session.players[seat].tile = to;
                        events.push(GameEvent::LadderClimbed { player: seat, from, to });
                    }
                    Some(Shortcut::Snake { to }) => {
                        session.players[seat].tile = to;
                        events.push(GameEvent::SnakeBitten { player: seat, from, to });
                    }
                    None => {}
                }
                TurnStage::CheckingWin
            }
            TurnStage::CheckingWin => {
                if session.players[seat].tile == WIN_TILE {
                    session.players[seat].won = true;
                    session.status = SessionStatus::Finished { winner: seat };
                    events.push(GameEvent::PlayerWon { player: seat });
                    tracing::info!(seat, name = %session.players[seat].name, "match won");
                    TurnStage::Idle
                } else {
                    TurnStage::AdvancingTurn
                }
            }
            TurnStage::AdvancingTurn => {
                session.turn_index = (session.turn_index + 1) % session.players.len();
                events.push(GameEvent::TurnAdvanced { next: session.turn_index });
                TurnStage::Idle
            }
            TurnStage::Idle => TurnStage::Idle,
        };
    }
    session.stage = TurnStage::Idle;

    tracing::debug!(seat, steps, tile = session.players[seat].tile, "turn resolved");
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dice::Dice;
    use crate::domain::player::{default_roster, Difficulty, Player};

    fn started() -> GameSession {
        let mut s = GameSession::new(default_roster(), Dice::seeded(2024));
        s.start_new_game();
        s
    }

    fn place(s: &mut GameSession, seat: usize, tile: u8) {
        s.players[seat].tile = tile;
    }

    // ── Single turns ──

    #[test]
    fn plain_move_advances_turn() {
        let mut s = started();
        place(&mut s, 0, 10);
        let events = s.apply_roll(3);
        assert_eq!(events, vec![
            GameEvent::DiceRolled { player: 0, value: 3 },
            GameEvent::PlayerMoved { player: 0, from: 10, to: 13 },
            GameEvent::TurnAdvanced { next: 1 },
        ]);
        assert_eq!(s.players[0].tile, 13);
        assert_eq!(s.dice_value(), 3);
        assert_eq!(s.turn_index(), 1);
        assert_eq!(s.stage(), TurnStage::Idle);
    }

    #[test]
    fn ladder_climb_is_reported() {
        let mut s = started();
        place(&mut s, 0, 24);
        let events = s.apply_roll(4); // 28 → 84
        assert!(events.contains(&GameEvent::PlayerMoved { player: 0, from: 24, to: 28 }));
        assert!(events.contains(&GameEvent::LadderClimbed { player: 0, from: 28, to: 84 }));
        assert_eq!(s.players[0].tile, 84);
    }

    #[test]
    fn snake_at_98_relocates_without_win() {
        let mut s = started();
        place(&mut s, 0, 92);
        let events = s.apply_roll(6);
        assert!(events.contains(&GameEvent::SnakeBitten { player: 0, from: 98, to: 78 }));
        assert_eq!(s.players[0].tile, 78);
        assert!(!s.players[0].won);
        assert_eq!(s.session_status(), SessionStatus::InProgress);
        assert_eq!(s.turn_index(), 1);
    }

    #[test]
    fn overshoot_bounces_back() {
        let mut s = started();
        place(&mut s, 0, 98);
        let events = s.apply_roll(5);
        assert!(events.contains(&GameEvent::PlayerMoved { player: 0, from: 98, to: 97 }));
        assert_eq!(s.players[0].tile, 97);

        place(&mut s, 1, 95);
        s.apply_roll(6);
        assert_eq!(s.players[1].tile, 99);
    }

    #[test]
    fn bounce_onto_snake_still_bites() {
        let mut s = started();
        place(&mut s, 0, 99);
        // 99 + 6 = 105 → 95, snake 95 → 75
        let events = s.apply_roll(6);
        assert!(events.contains(&GameEvent::SnakeBitten { player: 0, from: 95, to: 75 }));
        assert_eq!(s.players[0].tile, 75);
    }

    #[test]
    fn forced_roll_is_clamped_to_a_face() {
        let mut s = started();
        place(&mut s, 0, 99);
        let events = s.apply_roll(200);
        assert_eq!(events[0], GameEvent::DiceRolled { player: 0, value: 6 });
        assert!(events.contains(&GameEvent::PlayerMoved { player: 0, from: 99, to: 95 }));
        assert_eq!(s.players[0].tile, 75);

        place(&mut s, 1, 10);
        s.apply_roll(0);
        assert_eq!(s.players[1].tile, 11);
        assert_eq!(s.dice_value(), 1);
    }

    // ── Winning ──

    #[test]
    fn exact_roll_wins_and_halts() {
        let mut s = started();
        place(&mut s, 0, 94);
        let events = s.apply_roll(6);
        assert_eq!(events.last(), Some(&GameEvent::PlayerWon { player: 0 }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::TurnAdvanced { .. })));
        assert!(s.players[0].won);
        assert_eq!(s.session_status(), SessionStatus::Finished { winner: 0 });
        assert_eq!(s.winner().map(|p| p.name.as_str()), Some("You"));
        assert_eq!(s.turn_index(), 0);

        // Further requests are ignored.
        let before: Vec<u8> = s.players.iter().map(|p| p.tile).collect();
        assert!(s.request_turn().is_empty());
        assert!(s.apply_roll(3).is_empty());
        let after: Vec<u8> = s.players.iter().map(|p| p.tile).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn ladder_to_100_wins() {
        let mut s = started();
        place(&mut s, 2, 77);
        s.turn_index = 2;
        let events = s.apply_roll(3); // 80 → 100
        assert!(events.contains(&GameEvent::LadderClimbed { player: 2, from: 80, to: 100 }));
        assert_eq!(events.last(), Some(&GameEvent::PlayerWon { player: 2 }));
        assert_eq!(s.session_status(), SessionStatus::Finished { winner: 2 });
    }

    #[test]
    fn player_who_already_won_cannot_move() {
        let mut s = started();
        s.players[0].won = true;
        assert!(!s.accepts_turn());
        assert!(s.request_turn().is_empty());
        assert_eq!(s.turn_index(), 0);
    }

    // ── Turn order ──

    #[test]
    fn turn_index_cycles_through_every_seat() {
        let mut s = started();
        let mut order = vec![];
        for _ in 0..9 {
            order.push(s.turn_index());
            // 2 from 1 lands on 3 (no shortcut); keep everyone far from the end.
            s.apply_roll(2);
            for seat in 0..4 {
                place(&mut s, seat, 1);
            }
        }
        assert_eq!(order, vec![0, 1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn dice_turns_cycle_until_someone_wins() {
        let mut s = started();
        let mut expected = 0;
        let mut turns = 0;
        while s.session_status() == SessionStatus::InProgress {
            assert_eq!(s.turn_index(), expected);
            let events = s.request_turn();
            assert!(!events.is_empty());
            if let Some(GameEvent::TurnAdvanced { next }) = events.last() {
                assert_eq!(*next, (expected + 1) % s.players.len());
                expected = *next;
            }
            turns += 1;
            assert!(turns < 10_000, "match never ended");
        }
        let winner = match s.session_status() {
            SessionStatus::Finished { winner } => winner,
            other => panic!("unexpected status {other:?}"),
        };
        assert_eq!(winner, s.turn_index());
        assert_eq!(s.players[winner].tile, WIN_TILE);
        assert_eq!(s.players.iter().filter(|p| p.won).count(), 1);
    }

    #[test]
    fn seeded_matches_replay_identically() {
        let play = |seed: u64| {
            let mut s = GameSession::new(default_roster(), Dice::seeded(seed));
            s.start_new_game();
            let mut log = vec![];
            while s.session_status() == SessionStatus::InProgress {
                log.extend(s.request_turn());
            }
            log
        };
        assert_eq!(play(77), play(77));
    }

    #[test]
    fn rolled_value_is_recorded() {
        let mut s = started();
        let events = s.request_turn();
        match events.first() {
            Some(GameEvent::DiceRolled { player: 0, value }) => {
                assert!((1..=6).contains(value));
                assert_eq!(s.dice_value(), *value);
            }
            other => panic!("expected a roll first, got {other:?}"),
        }
    }

    #[test]
    fn two_player_session() {
        let players = vec![Player::human("Ana"), Player::bot("Rex", Difficulty::Spicy)];
        let mut s = GameSession::new(players, Dice::seeded(3));
        s.start_new_game();
        s.apply_roll(1);
        assert_eq!(s.turn_index(), 1);
        s.apply_roll(1);
        assert_eq!(s.turn_index(), 0);
    }
}
