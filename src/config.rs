/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::player::{default_roster, Difficulty, Player};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub general: GeneralConfig,
    pub players: PlayersConfig,
    pub timing: TimingConfig,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    /// Fixed dice seed for reproducible matches. `None` = fresh entropy.
    pub seed: Option<u64>,
    pub fast_mode: bool,
    pub show_numbers: bool,
    pub sound: bool,
}

#[derive(Clone, Debug)]
pub struct PlayersConfig {
    pub human: String,
    pub bots: Vec<(String, Difficulty)>,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub dice_spin_frames: u32,
    pub fast_dice_spin_frames: u32,
    pub dice_spin_ms: u64,
    pub step_ms: u64,      // one tile of token walk
    pub fast_step_ms: u64,
    pub jump_frames: u32,  // ladder / snake arc
    pub fast_jump_frames: u32,
    pub jump_frame_ms: u64,
    pub message_hold_ms: u64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    players: TomlPlayers,
    #[serde(default)]
    timing: TomlTiming,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    fast_mode: bool,
    #[serde(default)]
    show_numbers: bool,
    #[serde(default = "default_true")]
    sound: bool,
}

#[derive(Deserialize, Debug)]
struct TomlPlayers {
    #[serde(default = "default_human")]
    human: String,
    /// `None` when the key is absent; an explicit empty list is warned about.
    #[serde(default)]
    bots: Option<Vec<TomlBot>>,
}

#[derive(Deserialize, Debug, Clone)]
struct TomlBot {
    name: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame")]
    frame_ms: u64,
    #[serde(default = "default_spin_frames")]
    dice_spin_frames: u32,
    #[serde(default = "default_fast_spin_frames")]
    fast_dice_spin_frames: u32,
    #[serde(default = "default_spin_ms")]
    dice_spin_ms: u64,
    #[serde(default = "default_step")]
    step_ms: u64,
    #[serde(default = "default_fast_step")]
    fast_step_ms: u64,
    #[serde(default = "default_jump_frames")]
    jump_frames: u32,
    #[serde(default = "default_fast_jump_frames")]
    fast_jump_frames: u32,
    #[serde(default = "default_jump_frame")]
    jump_frame_ms: u64,
    #[serde(default = "default_message_hold")]
    message_hold_ms: u64,
}

// ── Defaults ──

fn default_true() -> bool { true }
fn default_human() -> String { "You".into() }
fn default_difficulty() -> String { "Balanced".into() }

fn default_frame() -> u64 { 16 }          // ~60 fps
fn default_spin_frames() -> u32 { 12 }
fn default_fast_spin_frames() -> u32 { 4 }
fn default_spin_ms() -> u64 { 33 }        // 30 fps spin
fn default_step() -> u64 { 83 }           // 12 tiles/s
fn default_fast_step() -> u64 { 25 }      // 40 tiles/s
fn default_jump_frames() -> u32 { 28 }
fn default_fast_jump_frames() -> u32 { 12 }
fn default_jump_frame() -> u64 { 16 }
fn default_message_hold() -> u64 { 400 }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            fast_mode: false,
            show_numbers: false,
            sound: default_true(),
        }
    }
}

impl Default for TomlPlayers {
    fn default() -> Self {
        TomlPlayers {
            human: default_human(),
            bots: None,
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame(),
            dice_spin_frames: default_spin_frames(),
            fast_dice_spin_frames: default_fast_spin_frames(),
            dice_spin_ms: default_spin_ms(),
            step_ms: default_step(),
            fast_step_ms: default_fast_step(),
            jump_frames: default_jump_frames(),
            fast_jump_frames: default_fast_jump_frames(),
            jump_frame_ms: default_jump_frame(),
            message_hold_ms: default_message_hold(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/snakeladder`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        match read_config_text(&candidate_dirs()) {
            Some(text) => Self::parse(&text),
            None => Self::default(),
        }
    }

    /// Parse config text directly; parse errors yield defaults.
    pub fn parse(text: &str) -> Self {
        let toml_cfg = toml::from_str::<TomlConfig>(text).unwrap_or_else(|e| {
            tracing::warn!("config parse error: {e}; using default settings");
            TomlConfig::default()
        });
        Self::from_toml(toml_cfg)
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        let configured = toml_cfg.players.bots;
        let mut bots: Vec<(String, Difficulty)> = configured.iter().flatten()
            .map(|b| {
                let difficulty = Difficulty::from_name(&b.difficulty).unwrap_or_else(|| {
                    tracing::warn!(bot = %b.name, tier = %b.difficulty, "unknown difficulty, using Balanced");
                    Difficulty::Balanced
                });
                (b.name.clone(), difficulty)
            })
            .collect();
        if bots.is_empty() {
            if configured.is_some() {
                tracing::warn!("no bots configured; using the default three");
            }
            bots = default_roster().into_iter()
                .filter_map(|p| p.difficulty().map(|d| (p.name, d)))
                .collect();
        }

        let t = toml_cfg.timing;
        GameConfig {
            general: GeneralConfig {
                seed: toml_cfg.general.seed,
                fast_mode: toml_cfg.general.fast_mode,
                show_numbers: toml_cfg.general.show_numbers,
                sound: toml_cfg.general.sound,
            },
            players: PlayersConfig {
                human: toml_cfg.players.human,
                bots,
            },
            timing: TimingConfig {
                frame_ms: t.frame_ms.max(1),
                dice_spin_frames: t.dice_spin_frames,
                fast_dice_spin_frames: t.fast_dice_spin_frames,
                dice_spin_ms: t.dice_spin_ms,
                step_ms: t.step_ms,
                fast_step_ms: t.fast_step_ms,
                jump_frames: t.jump_frames.max(1),
                fast_jump_frames: t.fast_jump_frames.max(1),
                jump_frame_ms: t.jump_frame_ms,
                message_hold_ms: t.message_hold_ms,
            },
        }
    }

    /// Seat 0 is the human, bots follow in configured order.
    pub fn roster(&self) -> Vec<Player> {
        let mut roster = vec![Player::human(self.players.human.clone())];
        roster.extend(self.players.bots.iter().map(|(name, d)| Player::bot(name.clone(), *d)));
        roster
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

impl TimingConfig {
    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/snakeladder)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/snakeladder");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Text of the first readable config.toml in the candidate directories.
fn read_config_text(search_dirs: &[PathBuf]) -> Option<String> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::info!(path = %path.display(), "loaded config");
                    return Some(text);
                }
                Err(e) => {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        let cfg = GameConfig::parse("");
        assert_eq!(cfg.general.seed, None);
        assert!(cfg.general.sound);
        assert!(!cfg.general.fast_mode);
        assert_eq!(cfg.players.human, "You");
        assert_eq!(cfg.players.bots.len(), 3);
        assert_eq!(cfg.timing.dice_spin_frames, 12);
        assert_eq!(cfg.timing.fast_step_ms, 25);
    }

    #[test]
    fn default_roster_matches_stock_bots() {
        let roster = GameConfig::default().roster();
        let tiers: Vec<Option<Difficulty>> = roster.iter().map(|p| p.difficulty()).collect();
        assert_eq!(tiers, vec![
            None,
            Some(Difficulty::Chill),
            Some(Difficulty::Balanced),
            Some(Difficulty::Spicy),
        ]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(r#"
            [general]
            seed = 99
            show_numbers = true

            [timing]
            step_ms = 50
        "#);
        assert_eq!(cfg.general.seed, Some(99));
        assert!(cfg.general.show_numbers);
        assert!(cfg.general.sound);
        assert_eq!(cfg.timing.step_ms, 50);
        assert_eq!(cfg.timing.jump_frames, 28);
        assert_eq!(cfg.players.bots.len(), 3);
    }

    #[test]
    fn custom_bots_and_unknown_tier() {
        let cfg = GameConfig::parse(r#"
            [players]
            human = "Ana"
            bots = [
                { name = "Rex", difficulty = "spicy" },
                { name = "Moe", difficulty = "nightmare" },
                { name = "Lu" },
            ]
        "#);
        let roster = cfg.roster();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster[0].name, "Ana");
        assert!(roster[0].is_human());
        assert_eq!(roster[1].difficulty(), Some(Difficulty::Spicy));
        assert_eq!(roster[2].difficulty(), Some(Difficulty::Balanced));
        assert_eq!(roster[3].difficulty(), Some(Difficulty::Balanced));
    }

    #[test]
    fn empty_bot_list_falls_back() {
        let cfg = GameConfig::parse("[players]\nbots = []\n");
        let stock: Vec<(String, Difficulty)> = default_roster().into_iter()
            .filter_map(|p| p.difficulty().map(|d| (p.name, d)))
            .collect();
        assert_eq!(cfg.players.bots, stock);
        assert_eq!(GameConfig::default().players.bots, stock);
    }

    #[test]
    fn config_file_is_found_in_search_dirs() {
        let dir = std::env::temp_dir().join(format!("snakeladder-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[general]\nseed = 7\n").unwrap();

        let missing = dir.join("nowhere");
        let text = read_config_text(&[missing, dir.clone()]).unwrap();
        assert_eq!(GameConfig::parse(&text).general.seed, Some(7));
        assert!(read_config_text(&[dir.join("nowhere")]).is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_text_gives_defaults() {
        let cfg = GameConfig::parse("[general\nseed = ");
        assert_eq!(cfg.players.bots.len(), 3);
        assert_eq!(cfg.timing.frame_ms, 16);
    }
}
