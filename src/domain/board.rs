/// The fixed 10x10 board: shortcut table, movement rule, grid projection.
///
/// Tiles are numbered 1..=100 in boustrophedon order: row 0 is the bottom
/// row and runs left→right, row 1 runs right→left, and so on.
/// Shortcut semantics are centralized here; the turn engine and the bot
/// heuristic only ever ask `shortcut_at` / `resolve_shortcut`.

/// A square on the board, 1..=100.
pub type Tile = u8;

pub const FIRST_TILE: Tile = 1;
pub const WIN_TILE: Tile = 100;
pub const BOARD_SIZE: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shortcut {
    Ladder { to: Tile },
    Snake { to: Tile },
}

impl Shortcut {
    pub fn destination(self) -> Tile {
        match self {
            Shortcut::Ladder { to } | Shortcut::Snake { to } => to,
        }
    }
}

/// Origin → destination tables. Ladders climb, snakes drop.
#[derive(Clone, Copy, Debug)]
pub struct ShortcutMap {
    pub ladders: &'static [(Tile, Tile)],
    pub snakes: &'static [(Tile, Tile)],
}

pub const CLASSIC_BOARD: ShortcutMap = ShortcutMap {
    ladders: &[
        (1, 38),
        (4, 14),
        (9, 31),
        (21, 42),
        (28, 84),
        (36, 44),
        (51, 67),
        (71, 91),
        (80, 100),
    ],
    snakes: &[
        (98, 78),
        (95, 75),
        (93, 73),
        (87, 24),
        (64, 60),
        (62, 19),
        (54, 34),
        (17, 7),
    ],
};

impl ShortcutMap {
    /// Which shortcut, if any, starts on this tile.
    pub fn shortcut_at(&self, tile: Tile) -> Option<Shortcut> {
        if let Some(&(_, to)) = self.ladders.iter().find(|(from, _)| *from == tile) {
            return Some(Shortcut::Ladder { to });
        }
        self.snakes
            .iter()
            .find(|(from, _)| *from == tile)
            .map(|&(_, to)| Shortcut::Snake { to })
    }

    /// Destination if `tile` is a shortcut origin, else `tile` unchanged.
    #[allow(dead_code)]
    pub fn resolve_shortcut(&self, tile: Tile) -> Tile {
        self.shortcut_at(tile).map_or(tile, Shortcut::destination)
    }

    pub fn is_ladder_end(&self, tile: Tile) -> bool {
        self.ladders.iter().any(|&(_, to)| to == tile)
    }

    pub fn is_snake_tail(&self, tile: Tile) -> bool {
        self.snakes.iter().any(|&(_, to)| to == tile)
    }

    /// Checks the table invariants: ladders go up, snakes go down, every
    /// entry stays on the board, no origin is shared between the two tables,
    /// and no destination is itself an origin (single-hop resolution).
    pub fn is_consistent(&self) -> bool {
        let on_board = |t: Tile| (FIRST_TILE..=WIN_TILE).contains(&t);
        let all = || self.ladders.iter().chain(self.snakes.iter());

        let ladders_up = self.ladders.iter().all(|&(from, to)| to > from);
        let snakes_down = self.snakes.iter().all(|&(from, to)| to < from);
        let bounded = all().all(|&(from, to)| on_board(from) && on_board(to));
        let unique_origins = all()
            .enumerate()
            .all(|(i, &(from, _))| all().skip(i + 1).all(|&(other, _)| other != from));
        let single_hop = all().all(|&(_, to)| all().all(|&(from, _)| from != to));

        ladders_up && snakes_down && bounded && unique_origins && single_hop
    }
}

/// Where a token lands after `steps` from `from`. Rolling past 100 bounces
/// back off the last tile by the excess.
pub fn move_target(from: Tile, steps: u8) -> Tile {
    let raw = from as u16 + steps as u16;
    let target = if raw > WIN_TILE as u16 {
        WIN_TILE as u16 - (raw - WIN_TILE as u16)
    } else {
        raw
    };
    debug_assert!(target >= FIRST_TILE as u16, "bounce left the board: {from}+{steps}");
    target as Tile
}

/// Grid position of a tile: `(col, row)` with row 0 at the bottom.
pub fn tile_to_grid(tile: Tile) -> (usize, usize) {
    let n = tile.saturating_sub(1) as usize;
    let row = n / BOARD_SIZE;
    let mut col = n % BOARD_SIZE;
    if row % 2 == 1 {
        col = BOARD_SIZE - 1 - col;
    }
    (col, row)
}

/// Inverse of `tile_to_grid`.
pub fn grid_to_tile(col: usize, row: usize) -> Tile {
    let offset = if row % 2 == 1 { BOARD_SIZE - 1 - col } else { col };
    (row * BOARD_SIZE + offset + 1) as Tile
}
