//! Read-only terminal presentation of a session.
//!
//! [`Playfield`] composes board, ghost and current piece into plain cells and
//! is pure (no I/O) so it can be unit-tested. [`Screen`] queues crossterm
//! commands for a whole frame into a byte buffer and flushes it at once.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::core::{HighscoreStore, Piece, Session};
use crate::input::{key_name, Keymap};
use crate::types::{Rgb, SessionState, BOARD_HEIGHT, BOARD_WIDTH, HIGHSCORE_PAGE_SIZE};

/// What one board cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellView {
    #[default]
    Empty,
    Ghost(Rgb),
    Block(Rgb),
}

/// Board with the ghost and the current piece drawn in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playfield {
    cells: [[CellView; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Playfield {
    pub fn compose<S: HighscoreStore>(session: &Session<S>) -> Self {
        let mut cells = [[CellView::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
        for (y, row) in session.board().rows().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(color) = cell {
                    cells[y][x] = CellView::Block(*color);
                }
            }
        }

        let mut field = Self { cells };
        if matches!(session.state(), SessionState::Playing | SessionState::Paused) {
            let ghost = session.ghost();
            field.paint(&ghost, CellView::Ghost(ghost.color()));
            let current = session.current();
            field.paint(current, CellView::Block(current.color()));
        }
        field
    }

    fn paint(&mut self, piece: &Piece, view: CellView) {
        for (x, y) in piece.cells() {
            if (0..BOARD_WIDTH as i32).contains(&x) && (0..BOARD_HEIGHT as i32).contains(&y) {
                self.cells[y as usize][x as usize] = view;
            }
        }
    }

    pub fn get(&self, x: usize, y: usize) -> CellView {
        self.cells[y][x]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellView; BOARD_WIDTH]> {
        self.cells.iter()
    }
}

fn term_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Raw-mode alternate screen with a reusable frame buffer.
pub struct Screen {
    stdout: io::Stdout,
    buf: Vec<u8>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Draw one full frame.
    pub fn draw<S: HighscoreStore>(&mut self, session: &Session<S>, keymap: &Keymap) -> Result<()> {
        self.buf.clear();
        self.buf.queue(terminal::Clear(terminal::ClearType::All))?;

        match session.state() {
            SessionState::TitleScreen => self.title(keymap)?,
            SessionState::OptionsSelect => self.options(session)?,
            SessionState::ControlsHelp => self.controls(keymap)?,
            SessionState::Playing | SessionState::Paused | SessionState::GameOver => {
                self.game(session)?;
                if session.state() == SessionState::Paused {
                    self.text(6, 10, "PAUSED", Color::White)?;
                }
                if session.state() == SessionState::GameOver {
                    self.game_over(session)?;
                }
            }
        }

        self.buf.queue(ResetColor)?;
        self.flush_buf()
    }

    fn text(&mut self, x: u16, y: u16, s: &str, color: Color) -> Result<()> {
        self.buf.queue(cursor::MoveTo(x, y))?;
        self.buf.queue(SetForegroundColor(color))?;
        self.buf.queue(Print(s))?;
        Ok(())
    }

    fn title(&mut self, keymap: &Keymap) -> Result<()> {
        use crate::types::InputAction::*;
        self.text(4, 2, "B L O C K F A L L", Color::Cyan)?;
        let lines = [
            (MenuSelect, "start"),
            (ShowControls, "controls"),
            (Quit, "quit"),
        ];
        for (i, (action, label)) in lines.iter().enumerate() {
            let key = keymap.key_for(*action).map(key_name).unwrap_or_default();
            self.text(4, 5 + i as u16, &format!("{key:>8}  {label}"), Color::White)?;
        }
        Ok(())
    }

    fn options<S: HighscoreStore>(&mut self, session: &Session<S>) -> Result<()> {
        let (min, max) = session.music_range();
        self.text(4, 2, "OPTIONS", Color::Cyan)?;
        self.text(
            4,
            4,
            &format!("Level  < {:>2} >", session.selected_level()),
            Color::White,
        )?;
        self.text(
            4,
            5,
            &format!("Music  v {:>2} ^   ({min}-{max})", session.selected_music()),
            Color::White,
        )?;
        self.text(4, 7, "Select to play, back to leave", Color::DarkGrey)
    }

    fn controls(&mut self, keymap: &Keymap) -> Result<()> {
        self.text(4, 1, "CONTROLS", Color::Cyan)?;
        for (i, (action, code)) in keymap.bindings().iter().enumerate() {
            let line = format!("{:<24}{}", action.as_str(), key_name(*code));
            self.text(4, 3 + i as u16, &line, Color::White)?;
        }
        Ok(())
    }

    fn game<S: HighscoreStore>(&mut self, session: &Session<S>) -> Result<()> {
        let field = Playfield::compose(session);
        let left: u16 = 2;

        for (y, row) in field.rows().enumerate() {
            self.buf.queue(cursor::MoveTo(left, y as u16 + 1))?;
            self.buf.queue(SetForegroundColor(Color::DarkGrey))?;
            self.buf.queue(Print("|"))?;
            for cell in row {
                match cell {
                    CellView::Empty => {
                        self.buf.queue(SetForegroundColor(Color::DarkGrey))?;
                        self.buf.queue(Print(" ."))?;
                    }
                    CellView::Ghost(c) => {
                        self.buf.queue(SetForegroundColor(term_color(*c)))?;
                        self.buf.queue(Print("░░"))?;
                    }
                    CellView::Block(c) => {
                        self.buf.queue(SetForegroundColor(term_color(*c)))?;
                        self.buf.queue(Print("██"))?;
                    }
                }
            }
            self.buf.queue(SetForegroundColor(Color::DarkGrey))?;
            self.buf.queue(Print("|"))?;
        }
        let floor = format!("+{}+", "-".repeat(BOARD_WIDTH * 2));
        self.text(left, BOARD_HEIGHT as u16 + 1, &floor, Color::DarkGrey)?;

        let panel = left + BOARD_WIDTH as u16 * 2 + 4;
        self.text(panel, 1, &format!("Score  {}", session.score()), Color::White)?;
        self.text(panel, 2, &format!("Level  {}", session.level()), Color::White)?;
        self.text(panel, 3, &format!("Lines  {}", session.total_lines()), Color::White)?;

        self.text(panel, 5, "NEXT", Color::Cyan)?;
        self.preview(panel, 6, Some(session.next()))?;
        self.text(panel, 11, "HOLD", Color::Cyan)?;
        self.preview(panel, 12, session.held())
    }

    fn preview(&mut self, x: u16, y: u16, piece: Option<&Piece>) -> Result<()> {
        let Some(piece) = piece else {
            return Ok(());
        };
        self.buf.queue(SetForegroundColor(term_color(piece.color())))?;
        for (row, col) in piece.shape().occupied() {
            self.buf.queue(cursor::MoveTo(x + col as u16 * 2, y + row as u16))?;
            self.buf.queue(Print("██"))?;
        }
        Ok(())
    }

    fn game_over<S: HighscoreStore>(&mut self, session: &Session<S>) -> Result<()> {
        let x = 2 + BOARD_WIDTH as u16 * 2 + 4;
        self.text(x, 15, "GAME OVER", Color::Red)?;

        let mut y = 16;
        if let Some(name) = session.name_entry() {
            self.text(x, y, &format!("New highscore! Name: {}_", name.as_str()), Color::Yellow)?;
            y += 1;
        }

        let scores = session.highscores();
        let start = session.scroll_offset().min(scores.len());
        let end = (start + HIGHSCORE_PAGE_SIZE).min(scores.len());
        for (i, entry) in scores[start..end].iter().enumerate() {
            let line = format!(
                "{:>2}. {:<10} {:>7}  L{} {} lines",
                start + i + 1,
                entry.name,
                entry.score,
                entry.level,
                entry.total_lines
            );
            self.text(x, y + i as u16, &line, Color::White)?;
        }
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Catalog, MemoryHighscores, SessionOptions};

    #[test]
    fn test_title_has_empty_playfield() {
        let session = Session::new(
            Catalog::standard().unwrap(),
            MemoryHighscores::new(),
            SessionOptions::default(),
        );
        let field = Playfield::compose(&session);
        assert!(field.rows().flatten().all(|c| *c == CellView::Empty));
    }

    #[test]
    fn test_playing_shows_piece_and_ghost() {
        let mut session = Session::new(
            Catalog::standard().unwrap(),
            MemoryHighscores::new(),
            SessionOptions::default(),
        );
        session.start_game(1);
        let field = Playfield::compose(&session);

        let blocks = field
            .rows()
            .flatten()
            .filter(|c| matches!(c, CellView::Block(_)))
            .count();
        let ghosts = field
            .rows()
            .flatten()
            .filter(|c| matches!(c, CellView::Ghost(_)))
            .count();
        assert_eq!(blocks, 4);
        assert_eq!(ghosts, 4);
    }
}
