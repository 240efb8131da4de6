//! Explicit cursor model.
//!
//! Every renderer operation starts where the previous one left the cursor.
//! Rather than trusting that coupling implicitly, [`Surface`] tracks the
//! cursor alongside each [`Screen`] call using the same rules the screen
//! follows, so the position can be asserted at any point.

use std::io;

use crate::{Screen, Style};

/// Cursor position (zero-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Column.
    pub column: u16,
    /// Row.
    pub row: u16,
}

impl Cursor {
    /// Create a cursor at `(column, row)`.
    pub fn new(column: u16, row: u16) -> Self {
        Self { column, row }
    }

    /// Clamp into a `columns` x `rows` screen.
    #[must_use]
    pub fn clamped(self, columns: u16, rows: u16) -> Self {
        Self {
            column: self.column.min(columns.saturating_sub(1)),
            row: self.row.min(rows.saturating_sub(1)),
        }
    }

    /// Position after moving `n` rows up.
    #[must_use]
    pub fn up(self, n: u16) -> Self {
        Self { row: self.row.saturating_sub(n), ..self }
    }

    /// Position after writing `width` columns on a screen `columns` wide.
    #[must_use]
    pub fn advanced(self, width: usize, columns: u16) -> Self {
        let last = usize::from(columns.saturating_sub(1));
        let column = (usize::from(self.column) + width).min(last) as u16;
        Self { column, ..self }
    }

    /// Position after a newline on a screen `rows` high.
    #[must_use]
    pub fn next_line(self, rows: u16) -> Self {
        Self { column: 0, row: (self.row + 1).min(rows.saturating_sub(1)) }
    }
}

/// A [`Screen`] paired with its cursor model.
#[derive(Debug)]
pub struct Surface<S> {
    screen: S,
    cursor: Cursor,
}

impl<S: Screen> Surface<S> {
    /// Wrap a screen. The model starts at the origin; callers position the
    /// cursor absolutely before relying on it.
    pub fn new(screen: S) -> Self {
        Self { screen, cursor: Cursor::default() }
    }

    /// Modelled cursor position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Screen size (columns, rows).
    pub fn size(&self) -> (u16, u16) {
        self.screen.size()
    }

    /// Number of columns.
    pub fn columns(&self) -> u16 {
        self.screen.size().0
    }

    /// Index of the bottom row.
    pub fn bottom(&self) -> u16 {
        self.screen.size().1.saturating_sub(1)
    }

    /// Underlying screen.
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Underlying screen, mutably.
    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    /// Unwrap the screen.
    pub fn into_screen(self) -> S {
        self.screen
    }

    /// Record a new size and clamp the cursor into it.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.screen.resize(columns, rows);
        self.cursor = self.cursor.clamped(columns, rows);
    }

    /// Move `n` rows up.
    pub fn move_up(&mut self, n: u16) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.screen.move_up(n)?;
        self.cursor = self.cursor.up(n);
        Ok(())
    }

    /// Move to `column` on the current row.
    pub fn move_to_column(&mut self, column: u16) -> io::Result<()> {
        self.screen.move_to_column(column)?;
        let (columns, rows) = self.size();
        self.cursor = Cursor { column, ..self.cursor }.clamped(columns, rows);
        Ok(())
    }

    /// Move to an absolute position.
    pub fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        self.screen.move_to(column, row)?;
        let (columns, rows) = self.size();
        self.cursor = Cursor::new(column, row).clamped(columns, rows);
        Ok(())
    }

    /// Clear from the cursor down.
    pub fn clear_down(&mut self) -> io::Result<()> {
        self.screen.clear_down()
    }

    /// Clear the current row.
    pub fn clear_line(&mut self) -> io::Result<()> {
        self.screen.clear_line()
    }

    /// Clear screen and scrollback.
    pub fn clear_all(&mut self) -> io::Result<()> {
        self.screen.clear_all()
    }

    /// Write text, clipped to the current row.
    pub fn write(&mut self, text: &str, style: Style) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let columns = self.columns();
        let room = usize::from(columns.saturating_sub(self.cursor.column));
        let width = text.chars().count();
        if width > room {
            let end = text.char_indices().nth(room).map_or(text.len(), |(idx, _)| idx);
            self.screen.write(&text[..end], style)?;
        } else {
            self.screen.write(text, style)?;
        }
        self.cursor = self.cursor.advanced(width.min(room), columns);
        Ok(())
    }

    /// Carriage return plus line feed.
    pub fn newline(&mut self) -> io::Result<()> {
        self.screen.newline()?;
        self.cursor = self.cursor.next_line(self.size().1);
        Ok(())
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.screen.flush()
    }
}
