/// Pure game rules: board, players, dice. No state container, no IO.

pub mod board;
pub mod dice;
pub mod player;
