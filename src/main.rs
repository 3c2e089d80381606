/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::Instant;

use crossterm::event::KeyCode;
use rand::Rng;

use config::GameConfig;
use domain::dice::Dice;
use sim::session::{GameSession, SessionStatus};
use ui::input::InputState;
use ui::playback::{Playback, View};
use ui::renderer::{Renderer, Scene, MENU_ITEMS};
use ui::sound::SoundEngine;
use ui::Screen;

const WELCOME: &str = "Welcome to ITM Snake Game!";
const GAME_STARTED: &str = "Game started! You're Blue.";

fn main() {
    logging::init();
    let config = GameConfig::load();

    let mut session = GameSession::new(config.roster(), Dice::new(config.general.seed));
    session.set_fast_mode(config.general.fast_mode);
    session.toggle_board_numbering(config.general.show_numbers);

    let sound = if config.general.sound { SoundEngine::new() } else { None };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    match session.winner() {
        Some(p) => println!("Thanks for playing! Last winner: {}", p.name),
        None => println!("Thanks for playing!"),
    }
}

/// Loop-local state that isn't part of the game rules.
struct Frontend {
    screen: Screen,
    menu_selection: usize,
    view: View,
    playback: Playback,
    /// When the current bot may roll. `None` = not scheduled yet.
    bot_ready_at: Option<Instant>,
    music_on: bool,
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut rng = rand::thread_rng();
    let mut ui = Frontend {
        screen: Screen::Menu,
        menu_selection: 0,
        view: View::new(WELCOME),
        playback: Playback::new(),
        bot_ready_at: None,
        music_on: false,
    };
    ui.view.sync(session);

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }
        // A key that switches into Playing must not also roll.
        let was_playing = ui.screen == Screen::Playing;
        if handle_meta(session, &mut ui, sound, &kb) {
            break;
        }

        let now = Instant::now();
        for sfx in ui.playback.tick(now, &mut ui.view) {
            if let Some(s) = sound {
                s.play(sfx);
            }
        }

        if ui.screen == Screen::Playing && ui.playback.is_idle(now) {
            match session.session_status() {
                SessionStatus::Finished { .. } => {
                    ui.screen = Screen::GameOver;
                    ui.bot_ready_at = None;
                }
                SessionStatus::InProgress => {
                    let human_turn = session.current_player().is_human();
                    let roll = if human_turn {
                        was_playing && kb.any_pressed(KEYS_CONFIRM)
                    } else {
                        bot_due(session, &mut ui, now, &mut rng)
                    };
                    if roll {
                        ui.bot_ready_at = None;
                        let events = session.request_turn();
                        ui.playback.enqueue(
                            &events,
                            session.player_list(),
                            &config.timing,
                            session.fast_mode(),
                            &mut rng,
                        );
                    }
                }
                SessionStatus::NotStarted => {}
            }
        }

        renderer.render(&Scene {
            session: &*session,
            view: &ui.view,
            screen: ui.screen,
            menu_selection: ui.menu_selection,
            music_on: ui.music_on,
        })?;
        std::thread::sleep(config.timing.frame());
    }

    Ok(())
}

/// Schedule the current bot's think delay on first sight, then report
/// whether it has elapsed.
fn bot_due<R: Rng>(session: &GameSession, ui: &mut Frontend, now: Instant, rng: &mut R) -> bool {
    let ready_at = match ui.bot_ready_at {
        Some(t) => t,
        None => {
            let Some(d) = session.current_player().difficulty() else { return false };
            let t = now + d.profile().think_delay(rng);
            tracing::debug!(bot = %session.current_player().name, delay_ms = (t - now).as_millis() as u64, "bot thinking");
            ui.bot_ready_at = Some(t);
            t
        }
    };
    now >= ready_at
}

fn start_new_game(session: &mut GameSession, ui: &mut Frontend, sound: Option<&SoundEngine>) {
    session.start_new_game();
    ui.music_on = sound.map_or(false, |s| s.start_music());
    ui.playback.clear();
    ui.bot_ready_at = None;
    ui.view.sync(session);
    ui.view.message = GAME_STARTED.to_string();
    ui.screen = Screen::Playing;
}

fn return_to_menu(session: &GameSession, ui: &mut Frontend) {
    ui.playback.clear();
    ui.bot_ready_at = None;
    ui.view.sync(session);
    ui.view.message = WELCOME.to_string();
    ui.menu_selection = 0;
    ui.screen = Screen::Menu;
}

// ── Key Constants ──

const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_NEW: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_FAST: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F')];
const KEYS_GRID: &[KeyCode] = &[KeyCode::Char('g'), KeyCode::Char('G')];
const KEYS_MUSIC: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

/// Screen-level keys. Returns true when the player asked to quit.
/// The roll key is read by the loop itself, since it depends on playback.
fn handle_meta(
    session: &mut GameSession,
    ui: &mut Frontend,
    sound: Option<&SoundEngine>,
    kb: &InputState,
) -> bool {
    match ui.screen {
        Screen::Menu => {
            if kb.any_pressed(KEYS_QUIT) {
                return true;
            }
            if kb.any_pressed(KEYS_UP) {
                ui.menu_selection = (ui.menu_selection + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
            } else if kb.any_pressed(KEYS_DOWN) {
                ui.menu_selection = (ui.menu_selection + 1) % MENU_ITEMS.len();
            } else if kb.any_pressed(KEYS_CONFIRM) {
                match ui.menu_selection {
                    0 => start_new_game(session, ui, sound),
                    1 => {
                        let on = !session.show_numbers();
                        session.toggle_board_numbering(on);
                    }
                    _ => return true,
                }
            }
        }
        Screen::Playing => {
            if kb.any_pressed(&[KeyCode::Esc]) {
                return_to_menu(session, ui);
            } else if kb.any_pressed(KEYS_NEW) {
                start_new_game(session, ui, sound);
            } else if kb.any_pressed(KEYS_FAST) {
                let on = !session.fast_mode();
                session.set_fast_mode(on);
            } else if kb.any_pressed(KEYS_GRID) {
                let on = !session.show_numbers();
                session.toggle_board_numbering(on);
            } else if kb.any_pressed(KEYS_MUSIC) {
                if let Some(s) = sound {
                    ui.music_on = s.toggle_music();
                }
            }
        }
        Screen::GameOver => {
            if kb.any_pressed(&[KeyCode::Esc]) {
                return_to_menu(session, ui);
            } else if kb.any_pressed(KEYS_NEW) || kb.any_pressed(&[KeyCode::Enter]) {
                start_new_game(session, ui, sound);
            }
        }
    }
    false
}
