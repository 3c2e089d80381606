/// Tracing setup.
///
/// The terminal is in raw mode while the board is on screen, so by default
/// only warnings reach stderr (config problems, audio init failures, all of
/// which happen before the screen is taken over). `SNAKELADDER_LOG=<path>`
/// sends everything to a file instead, filtered by `RUST_LOG` (default
/// `debug`).

use std::fs::File;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SNAKELADDER_LOG";

pub fn init() {
    if let Ok(path) = std::env::var(LOG_ENV) {
        match File::create(&path) {
            Ok(file) => {
                let filter = EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("debug"));
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .try_init();
                return;
            }
            Err(e) => eprintln!("Warning: could not open log file {path}: {e}"),
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
