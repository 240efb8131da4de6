//! Terminal control surface.
//!
//! The [`Screen`] trait is the only way the renderer touches a terminal.
//! Production implements it with crossterm; tests use an in-memory screen
//! buffer with the same cursor semantics.

use std::io;

/// Visual style for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// Informational system message.
    Info,
    /// Successful lifecycle step.
    Success,
    /// Warning system message.
    Warning,
    /// Error system message.
    Error,
    /// Text received from the peer.
    Incoming,
    /// Text sent to the peer.
    Outgoing,
    /// Direction indicator before the first row of a chat message.
    Indicator,
    /// First cell of the prompt bar.
    BarTip,
    /// Remainder of the prompt bar.
    Bar,
    /// Text in the input line.
    Input,
}

/// Cursor-addressed terminal.
///
/// Coordinates are zero-based `(column, row)`. Implementations must follow
/// these rules, which the renderer's cursor model relies on:
///
/// - Moves clamp to the screen edges.
/// - [`write`](Screen::write) never wraps; text past the last column is
///   dropped and the cursor stops on the last column.
/// - [`newline`](Screen::newline) returns to column 0 and moves down one row,
///   scrolling the screen up when already on the bottom row.
pub trait Screen {
    /// Screen size (columns, rows).
    fn size(&self) -> (u16, u16);

    /// Record a new screen size.
    fn resize(&mut self, columns: u16, rows: u16);

    /// Move the cursor `n` rows up.
    fn move_up(&mut self, n: u16) -> io::Result<()>;

    /// Move the cursor to `column` on the current row.
    fn move_to_column(&mut self, column: u16) -> io::Result<()>;

    /// Move the cursor to an absolute position.
    fn move_to(&mut self, column: u16, row: u16) -> io::Result<()>;

    /// Clear from the cursor to the end of the screen.
    fn clear_down(&mut self) -> io::Result<()>;

    /// Clear the whole current row.
    fn clear_line(&mut self) -> io::Result<()>;

    /// Clear the screen and the scrollback. The cursor does not move.
    fn clear_all(&mut self) -> io::Result<()>;

    /// Write text at the cursor.
    fn write(&mut self, text: &str, style: Style) -> io::Result<()>;

    /// Carriage return plus line feed.
    fn newline(&mut self) -> io::Result<()>;

    /// Push buffered output to the terminal.
    fn flush(&mut self) -> io::Result<()>;
}
