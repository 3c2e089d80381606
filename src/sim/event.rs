/// Events emitted while a turn resolves.
/// The presentation layer consumes these for animation, messages and sound.

use crate::domain::board::Tile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    DiceRolled { player: usize, value: u8 },
    /// Raw board movement, before any shortcut. One event per turn; the
    /// presentation decides whether to walk it tile by tile.
    PlayerMoved { player: usize, from: Tile, to: Tile },
    LadderClimbed { player: usize, from: Tile, to: Tile },
    SnakeBitten { player: usize, from: Tile, to: Tile },
    PlayerWon { player: usize },
    TurnAdvanced { next: usize },
}
