//! Crossterm implementation of [`Screen`].
//!
//! Draws on the main screen, not the alternate one, so the conversation
//! stays in the terminal after exit. Autowrap is switched off while the
//! screen is live: a write never spills onto the next row, which is what
//! the renderer's cursor model expects.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{MoveTo, MoveToColumn, MoveUp},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use parley_app::{Screen, Style};

/// Terminal screen over any writer, stdout by default.
pub struct CrosstermScreen<W: Write = Stdout> {
    out: W,
    size: (u16, u16),
    /// Raw mode is ours to restore.
    raw: bool,
}

impl CrosstermScreen<Stdout> {
    /// Take over stdout: raw mode on, autowrap off.
    pub fn new() -> io::Result<Self> {
        let size = terminal::size()?;
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, DisableLineWrap)?;
        Ok(Self { out, size, raw: true })
    }
}

impl<W: Write> CrosstermScreen<W> {
    /// Screen over an arbitrary writer with a fixed size. The terminal mode
    /// is left alone.
    pub fn with_writer(out: W, columns: u16, rows: u16) -> Self {
        Self { out, size: (columns, rows), raw: false }
    }

    /// Underlying writer.
    pub fn writer(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Screen for CrosstermScreen<W> {
    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        self.size = (columns, rows);
    }

    fn move_up(&mut self, n: u16) -> io::Result<()> {
        // Most terminals read a zero count as one.
        if n == 0 {
            return Ok(());
        }
        queue!(self.out, MoveUp(n))
    }

    fn move_to_column(&mut self, column: u16) -> io::Result<()> {
        queue!(self.out, MoveToColumn(column))
    }

    fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        queue!(self.out, MoveTo(column, row))
    }

    fn clear_down(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::FromCursorDown))
    }

    fn clear_line(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::CurrentLine))
    }

    fn clear_all(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), Clear(ClearType::Purge))
    }

    fn write(&mut self, text: &str, style: Style) -> io::Result<()> {
        let (foreground, background) = colors(style);
        queue!(self.out, SetForegroundColor(foreground))?;
        if let Some(background) = background {
            queue!(self.out, SetBackgroundColor(background))?;
        }
        queue!(self.out, Print(text), ResetColor)
    }

    fn newline(&mut self) -> io::Result<()> {
        // Raw mode: LF alone does not return the carriage.
        queue!(self.out, Print("\r\n"))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for CrosstermScreen<W> {
    fn drop(&mut self) {
        if self.raw {
            let _ = execute!(self.out, ResetColor, EnableLineWrap);
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// Foreground and optional background for a style.
fn colors(style: Style) -> (Color, Option<Color>) {
    match style {
        Style::Info => (Color::Grey, None),
        Style::Success | Style::Incoming => (Color::DarkGreen, None),
        Style::Warning => (Color::DarkYellow, None),
        Style::Error => (Color::DarkRed, None),
        Style::Outgoing | Style::Input => (Color::DarkCyan, None),
        Style::Indicator | Style::Bar => (Color::White, None),
        Style::BarTip => (Color::Black, Some(Color::White)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> CrosstermScreen<Vec<u8>> {
        CrosstermScreen::with_writer(Vec::new(), 20, 5)
    }

    fn output(screen: &CrosstermScreen<Vec<u8>>) -> String {
        String::from_utf8_lossy(screen.writer()).into_owned()
    }

    #[test]
    fn cursor_moves_are_one_based_escapes() {
        let mut screen = screen();
        screen.move_up(2).unwrap();
        screen.move_to_column(0).unwrap();
        screen.move_to(0, 4).unwrap();

        assert_eq!(output(&screen), "\x1b[2A\x1b[1G\x1b[5;1H");
    }

    #[test]
    fn zero_move_up_emits_nothing() {
        let mut screen = screen();
        screen.move_up(0).unwrap();

        assert!(screen.writer().is_empty());
    }

    #[test]
    fn clear_all_purges_scrollback() {
        let mut screen = screen();
        screen.clear_all().unwrap();
        screen.clear_down().unwrap();

        assert_eq!(output(&screen), "\x1b[2J\x1b[3J\x1b[J");
    }

    #[test]
    fn styled_write_resets_afterwards() {
        let mut screen = screen();
        screen.write("hi", Style::Outgoing).unwrap();

        let out = output(&screen);
        assert!(out.contains("hi"));
        assert!(out.ends_with("\x1b[0m"));
    }

    #[test]
    fn newline_returns_carriage() {
        let mut screen = screen();
        screen.newline().unwrap();

        assert_eq!(output(&screen), "\r\n");
    }

    #[test]
    fn bar_tip_is_inverted() {
        assert_eq!(colors(Style::BarTip), (Color::Black, Some(Color::White)));
        assert_ne!(colors(Style::Incoming), colors(Style::Outgoing));
    }

    #[test]
    fn resize_only_records_size() {
        let mut screen = screen();
        screen.resize(80, 24);

        assert_eq!(screen.size(), (80, 24));
        assert!(screen.writer().is_empty());
    }
}
