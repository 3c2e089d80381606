/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Layout: the 10x10 board on the left (each tile is CELL_W x CELL_H
/// terminal cells, tile 1 bottom-left), the side panel on the right, and the
/// shortcut legend under the board.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::board::{grid_to_tile, tile_to_grid, Shortcut, BOARD_SIZE, WIN_TILE};
use crate::domain::player::Controller;
use crate::sim::session::{GameSession, SessionStatus};
use super::playback::View;
use super::Screen;

pub const TITLE: &str = "ITM Snake Game";
pub const MENU_ITEMS: [&str; 3] = ["Start Game", "Toggle Numbers", "Quit"];

/// Everything a frame needs, borrowed from the game loop.
pub struct Scene<'a> {
    pub session: &'a GameSession,
    pub view: &'a View,
    pub screen: Screen,
    pub menu_selection: usize,
    pub music_on: bool,
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell, so the terminal's default
    /// never shows through between rows.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 20, b: 28 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

// ── Palette ──

const PLAYER_COLORS: [Color; 4] = [
    Color::Rgb { r: 76, g: 139, b: 245 },  // human - blue
    Color::Rgb { r: 238, g: 99, b: 99 },   // bot 1 - red
    Color::Rgb { r: 70, g: 207, b: 123 },  // bot 2 - green
    Color::Rgb { r: 240, g: 220, b: 70 },  // bot 3 - yellow
];
const TILE_A: Color = Color::Rgb { r: 60, g: 75, b: 105 };
const TILE_B: Color = Color::Rgb { r: 55, g: 70, b: 98 };
const LADDER_C: Color = Color::Rgb { r: 180, g: 240, b: 180 };
const SNAKE_C: Color = Color::Rgb { r: 240, g: 150, b: 150 };
const PANEL_BG: Color = Color::Rgb { r: 28, g: 30, b: 44 };
const TEXT_C: Color = Color::Rgb { r: 230, g: 235, b: 255 };
const DIM_C: Color = Color::Rgb { r: 150, g: 155, b: 180 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 40 };

pub fn player_color(seat: usize) -> Color {
    PLAYER_COLORS[seat % PLAYER_COLORS.len()]
}

// ── Renderer ──

const CELL_W: usize = 6;
const CELL_H: usize = 2;
const BOARD_X: usize = 2;
const BOARD_Y: usize = 2;
const PANEL_X: usize = BOARD_X + BOARD_SIZE * CELL_W + 3;
const PANEL_W: usize = 34;
const LEGEND_Y: usize = BOARD_Y + BOARD_SIZE * CELL_H + 1;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((100, 26));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, scene: &Scene) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((100, 26));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_screen != Some(scene.screen) {
            self.back.cells.fill(Cell::INVALID);
            self.last_screen = Some(scene.screen);
        }

        self.front.clear();
        self.compose_board(scene);
        self.compose_tokens(scene);
        self.compose_legend(scene);
        self.compose_panel(scene);
        match scene.screen {
            Screen::Menu => self.compose_menu(scene),
            Screen::GameOver => self.compose_game_over(scene),
            Screen::Playing => {}
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_board(&mut self, s: &Scene) {
        let board = s.session.board();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let tile = grid_to_tile(col, row);
                let (x, y) = cell_origin(col, row);
                let bg = if (row + col) % 2 == 0 { TILE_A } else { TILE_B };
                self.front.fill(x, y, CELL_W, CELL_H, bg);

                if s.session.show_numbers() {
                    self.front.put_str(x, y, &format!("{:>3}", tile), DIM_C, bg);
                }

                let marker = match board.shortcut_at(tile) {
                    Some(Shortcut::Ladder { .. }) => Some(('▲', LADDER_C)),
                    Some(Shortcut::Snake { .. }) => Some(('▼', SNAKE_C)),
                    None if tile == WIN_TILE => Some(('★', ACCENT)),
                    None if board.is_ladder_end(tile) => Some(('╤', LADDER_C)),
                    None if board.is_snake_tail(tile) => Some(('~', SNAKE_C)),
                    None => None,
                };
                if let Some((ch, fg)) = marker {
                    self.front.set(x + CELL_W - 2, y, Cell::new(ch, fg, bg));
                }
            }
        }
    }

    fn compose_tokens(&mut self, s: &Scene) {
        for (seat, &tile) in s.view.tiles.iter().enumerate() {
            let (col, row) = tile_to_grid(tile);
            let (x, y) = cell_origin(col, row);
            let bg = self.front.get(x, y + 1).bg;
            let slot = 1 + seat.min(CELL_W - 2);
            self.front.set(x + slot, y + 1, Cell::new('●', player_color(seat), bg));
        }

        if let Some(f) = s.view.flyer {
            let col = f.col.round().clamp(0.0, (BOARD_SIZE - 1) as f32) as usize;
            let row = f.row.round().clamp(0.0, (BOARD_SIZE - 1) as f32) as usize;
            let (x, y) = cell_origin(col, row);
            let bg = self.front.get(x, y).bg;
            self.front.set(x + CELL_W / 2 - 1, y, Cell::new('◆', player_color(f.seat), bg));
        }
    }

    fn compose_legend(&mut self, s: &Scene) {
        let board = s.session.board();
        let list = |pairs: &[(u8, u8)]| {
            pairs.iter().map(|(a, b)| format!("{a}→{b}")).collect::<Vec<_>>().join(" ")
        };
        self.front.put_str(BOARD_X, LEGEND_Y, &format!("▲ Ladders  {}", list(board.ladders)), LADDER_C, Color::Reset);
        self.front.put_str(BOARD_X, LEGEND_Y + 1, &format!("▼ Snakes   {}", list(board.snakes)), SNAKE_C, Color::Reset);
    }

    fn compose_panel(&mut self, s: &Scene) {
        let x0 = PANEL_X;
        let height = LEGEND_Y + 2;
        self.front.fill(x0, 0, PANEL_W, height, PANEL_BG);
        self.front.put_str(x0 + 2, 1, TITLE, TEXT_C, PANEL_BG);

        // Player list
        let mut y = 3;
        let playing = s.screen == Screen::Playing;
        for (seat, p) in s.session.player_list().iter().enumerate() {
            let marker = if playing && seat == s.session.turn_index() { "▶ " } else { "  " };
            let tile = s.view.tiles.get(seat).copied().unwrap_or(p.tile);
            let tag = match p.controller {
                Controller::Human => String::new(),
                Controller::Bot(d) => format!(" ({})", d.name()),
            };
            let line = format!("{marker}{} - Tile {tile}{tag}", p.name);
            self.front.put_str(x0 + 2, y, &line, player_color(seat), PANEL_BG);
            y += 1;
        }

        // Dice
        y += 1;
        self.front.put_str(x0 + 2, y + 2, "Dice:", DIM_C, PANEL_BG);
        for (i, line) in dice_face(s.view.dice_face).iter().enumerate() {
            self.front.put_str(x0 + 9, y + i, line, Color::Rgb { r: 30, g: 30, b: 30 }, Color::Rgb { r: 240, g: 240, b: 240 });
        }
        y += 6;

        // Message box
        for (i, line) in wrap(&s.view.message, PANEL_W - 4).iter().take(4).enumerate() {
            self.front.put_str(x0 + 2, y + i, line, TEXT_C, PANEL_BG);
        }
        y += 5;

        // Flags + controls
        let on_off = |b: bool| if b { "on" } else { "off" };
        let flags = format!(
            "Fast:{} Grid:{} Music:{}",
            on_off(s.session.fast_mode()), on_off(s.session.show_numbers()), on_off(s.music_on),
        );
        self.front.put_str(x0 + 2, y, &flags, DIM_C, PANEL_BG);
        let controls = [
            "SPACE Roll   N New Game",
            "F Fast   G Grid   P Music",
            "ESC Menu",
        ];
        for (i, line) in controls.iter().enumerate() {
            if y + 1 + i < height {
                self.front.put_str(x0 + 2, y + 1 + i, line, DIM_C, PANEL_BG);
            }
        }
    }

    fn compose_menu(&mut self, s: &Scene) {
        let (bx, by, bw, bh) = overlay_box();
        let bg = Color::Rgb { r: 10, g: 10, b: 16 };
        self.front.fill(bx, by, bw, bh, bg);

        let title = format!("═══  {TITLE}  ═══");
        self.front.put_str(centered(bx, bw, &title), by + 2, &title, Color::White, bg);
        let sub = "1 Human + 3 Bots • Dice, Ladders & Snakes";
        self.front.put_str(centered(bx, bw, sub), by + 4, sub, DIM_C, bg);

        for (i, item) in MENU_ITEMS.iter().enumerate() {
            let selected = i == s.menu_selection;
            let label = if selected { format!("▸ {item} ◂") } else { item.to_string() };
            let fg = if selected { ACCENT } else { Color::White };
            self.front.put_str(centered(bx, bw, &label), by + 7 + i * 2, &label, fg, bg);
        }

        let numbers = format!("Numbers: {}", if s.session.show_numbers() { "on" } else { "off" });
        self.front.put_str(centered(bx, bw, &numbers), by + 14, &numbers, DIM_C, bg);
        let hint = "↑↓ Select   ENTER Confirm   Q Quit";
        self.front.put_str(centered(bx, bw, hint), by + bh - 2, hint, DIM_C, bg);
    }

    fn compose_game_over(&mut self, s: &Scene) {
        let (bx, by, bw, _) = overlay_box();
        let bg = Color::Rgb { r: 10, g: 10, b: 16 };
        self.front.fill(bx, by + 4, bw, 8, bg);

        let title = "★  Game Over  ★";
        self.front.put_str(centered(bx, bw, title), by + 6, title, ACCENT, bg);
        let msg = match s.session.session_status() {
            SessionStatus::Finished { winner } => {
                let name = s.session.player_list().get(winner).map_or("?", |p| p.name.as_str());
                (format!("{name} wins! Press N for New Game."), player_color(winner))
            }
            _ => ("Press N for New Game.".to_string(), Color::White),
        };
        self.front.put_str(centered(bx, bw, &msg.0), by + 8, &msg.0, msg.1, bg);
        let hint = "ESC Menu";
        self.front.put_str(centered(bx, bw, hint), by + 10, hint, DIM_C, bg);
    }
}

/// Top-left terminal cell of a board tile's block.
fn cell_origin(col: usize, row: usize) -> (usize, usize) {
    (BOARD_X + col * CELL_W, BOARD_Y + (BOARD_SIZE - 1 - row) * CELL_H)
}

fn overlay_box() -> (usize, usize, usize, usize) {
    let w = BOARD_SIZE * CELL_W - 8;
    (BOARD_X + 4, BOARD_Y + 1, w, BOARD_SIZE * CELL_H - 2)
}

fn centered(x: usize, w: usize, s: &str) -> usize {
    x + w.saturating_sub(s.chars().count()) / 2
}

/// Five text lines drawing a die face.
fn dice_face(value: u8) -> [String; 5] {
    // Pip grid, row-major 3x3.
    let pips: [bool; 9] = match value {
        1 => [false, false, false, false, true, false, false, false, false],
        2 => [true, false, false, false, false, false, false, false, true],
        3 => [true, false, false, false, true, false, false, false, true],
        4 => [true, false, true, false, false, false, true, false, true],
        5 => [true, false, true, false, true, false, true, false, true],
        _ => [true, false, true, true, false, true, true, false, true],
    };
    let row = |r: usize| {
        let p = |c: usize| if pips[r * 3 + c] { '●' } else { ' ' };
        format!("│ {} {} {} │", p(0), p(1), p(2))
    };
    [
        "┌───────┐".to_string(),
        row(0),
        row(1),
        row(2),
        "└───────┘".to_string(),
    ]
}

/// Greedy word wrap to `width` columns.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_blocks_do_not_overlap() {
        let mut seen = std::collections::HashSet::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                assert!(seen.insert(cell_origin(col, row)));
            }
        }
        // Row 0 (tiles 1-10) is the bottom of the board.
        assert_eq!(cell_origin(0, 0).1, BOARD_Y + (BOARD_SIZE - 1) * CELL_H);
        assert_eq!(cell_origin(0, 9).1, BOARD_Y);
    }

    #[test]
    fn panel_sits_right_of_board() {
        let (right_edge, _) = cell_origin(BOARD_SIZE - 1, 0);
        assert!(PANEL_X >= right_edge + CELL_W);
    }

    #[test]
    fn dice_faces_have_right_pip_count() {
        for v in 1..=6u8 {
            let pips: usize = dice_face(v).iter().map(|l| l.matches('●').count()).sum();
            assert_eq!(pips, v as usize);
        }
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("Oh no! Bot B bitten by snake to 78.", 12);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(lines.join(" "), "Oh no! Bot B bitten by snake to 78.");
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn long_word_gets_its_own_line() {
        let lines = wrap("a supercalifragilistic b", 6);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "abc", Color::White, Color::Reset);
        assert_eq!(fb.get(2, 0).ch, 'a');
        assert_eq!(fb.get(3, 0).ch, 'b');
        assert_eq!(fb.get(3, 0).bg, Cell::BASE_BG);
    }
}
