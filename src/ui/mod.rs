pub mod input;
pub mod playback;
pub mod renderer;
pub mod sound;

/// Which top-level screen the loop is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
}
