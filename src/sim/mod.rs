/// Match state and the turn engine.

pub mod event;
pub mod session;
pub mod turn;
