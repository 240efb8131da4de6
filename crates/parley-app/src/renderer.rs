//! Terminal renderer.
//!
//! Draws the conversation bottom-up on the main screen. After every public
//! call the screen reads, from the bottom:
//!
//! ```text
//! <input line>          <- cursor, bottom row
//! *█████████████████    <- prompt bar
//!                       <- blank spacer
//! <newest message>
//! ...
//! ```
//!
//! A new message is printed by stepping two rows up from the input line onto
//! the spacer, clearing everything below, writing the message rows and
//! regenerating the bar and input line underneath. Scrolling pushes older
//! rows into the terminal's scrollback. [`Renderer::full_redraw`] rebuilds
//! the whole screen from the [`MessageLog`] and is the only recovery from
//! drift, so it must produce the same picture as incremental printing.

use std::io;

use crate::{
    Cursor, EditOutcome, KeyInput, Level, LineEditor, Message, MessageLog, Origin, Screen, Style,
    Surface,
    wrap::{Side, wrap},
};

/// Prefix drawn before the first row of a chat message.
pub const INDICATOR: &str = "> ";

/// First cell of the prompt bar.
pub const BAR_TIP: char = '*';

/// Fill character of the prompt bar (U+2588 FULL BLOCK).
pub const BAR_BLOCK: char = '\u{2588}';

/// Terminal renderer owning the message log and the input line.
#[derive(Debug)]
pub struct Renderer<S> {
    surface: Surface<S>,
    log: MessageLog,
    input: LineEditor,
}

impl<S: Screen> Renderer<S> {
    /// Create a renderer with an empty log.
    pub fn new(screen: S) -> Self {
        Self { surface: Surface::new(screen), log: MessageLog::new(), input: LineEditor::new() }
    }

    /// Message log.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Input line state.
    pub fn input(&self) -> &LineEditor {
        &self.input
    }

    /// Modelled cursor position.
    pub fn cursor(&self) -> Cursor {
        self.surface.cursor()
    }

    /// Where the cursor belongs between operations: the input editor's
    /// column on the bottom row.
    pub fn input_position(&self) -> Cursor {
        let (_, column) = self.input.view(self.surface.columns());
        Cursor::new(column, self.surface.bottom())
    }

    /// Underlying screen.
    pub fn screen(&self) -> &S {
        self.surface.screen()
    }

    /// Underlying screen, mutably.
    pub fn screen_mut(&mut self) -> &mut S {
        self.surface.screen_mut()
    }

    /// Unwrap the screen.
    pub fn into_screen(self) -> S {
        self.surface.into_screen()
    }

    /// Print one message.
    ///
    /// Outside of a replay the message is appended to the log and the input
    /// area is rebuilt below it. A replay only writes the rows at the
    /// cursor; the caller owns the surrounding layout.
    pub fn print_message(&mut self, message: Message, replay: bool) -> io::Result<()> {
        if replay {
            return write_message(&mut self.surface, &message);
        }

        tracing::trace!(origin = ?message.origin, len = message.content.len(), "print message");
        self.log.push(message);

        // Up past the prompt bar onto the spacer row.
        self.surface.move_up(2)?;
        self.surface.move_to_column(0)?;
        self.surface.clear_down()?;

        if let Some(message) = self.log.last() {
            write_message(&mut self.surface, message)?;
        }
        self.surface.newline()?;
        self.regenerate_prompt()
    }

    /// Draw the prompt bar at the cursor and put the input line below it.
    pub fn regenerate_prompt(&mut self) -> io::Result<()> {
        let columns = self.surface.columns();
        let fill: String =
            std::iter::repeat_n(BAR_BLOCK, usize::from(columns.saturating_sub(1))).collect();

        self.surface.write(&BAR_TIP.to_string(), Style::BarTip)?;
        self.surface.write(&fill, Style::Bar)?;
        self.surface.newline()?;
        self.draw_input()?;
        self.surface.flush()
    }

    /// Clear screen and scrollback and rebuild everything from the log.
    pub fn full_redraw(&mut self) -> io::Result<()> {
        tracing::trace!(messages = self.log.len(), size = ?self.surface.size(), "full redraw");

        self.surface.clear_all()?;
        let bottom = self.surface.bottom();
        self.surface.move_to(0, bottom)?;

        for message in &self.log {
            write_message(&mut self.surface, message)?;
        }

        self.surface.newline()?;
        self.regenerate_prompt()
    }

    /// Feed a key to the input line, redrawing it when it changed.
    pub fn handle_key(&mut self, key: KeyInput) -> io::Result<EditOutcome> {
        let outcome = self.input.handle_key(key);
        if outcome == EditOutcome::Edited {
            self.draw_input()?;
            self.surface.flush()?;
        }
        Ok(outcome)
    }

    /// The newline a line reader echoes when Enter is pressed.
    pub fn echo_newline(&mut self) -> io::Result<()> {
        self.surface.newline()
    }

    /// Step back over the echoed newline onto the submitted line.
    pub fn offset_echo(&mut self) -> io::Result<()> {
        self.surface.move_up(1)
    }

    /// Adopt a new terminal size. Callers follow up with a full redraw.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.surface.resize(columns, rows);
    }

    /// Leave the cursor below the input line before the process exits.
    pub fn finish(&mut self) -> io::Result<()> {
        let bottom = self.surface.bottom();
        self.surface.move_to(0, bottom)?;
        self.surface.newline()?;
        self.surface.flush()
    }

    fn draw_input(&mut self) -> io::Result<()> {
        let bottom = self.surface.bottom();
        self.surface.move_to(0, bottom)?;
        self.surface.clear_line()?;

        let (text, column) = self.input.view(self.surface.columns());
        self.surface.write(text, Style::Input)?;
        self.surface.move_to_column(column)
    }
}

/// Write the rows of `message` starting at the cursor row. Ends at column 0
/// of the row after the last one.
fn write_message<S: Screen>(surface: &mut Surface<S>, message: &Message) -> io::Result<()> {
    surface.move_to_column(0)?;

    let columns = surface.columns();
    let (side, indicator, style) = placement(message.origin);

    for (i, line) in display_lines(&message.content).iter().enumerate() {
        let indicator = if i == 0 { indicator } else { "" };
        for row in wrap(line, columns, side, indicator) {
            surface.move_to_column(row.column)?;
            if let Some(prefix) = row.prefix {
                surface.write(prefix, Style::Indicator)?;
            }
            surface.write(row.text, style)?;
            surface.newline()?;
        }
    }

    surface.move_to_column(0)
}

fn placement(origin: Origin) -> (Side, &'static str, Style) {
    match origin {
        Origin::System(Level::Info) => (Side::Left, "", Style::Info),
        Origin::System(Level::Success) => (Side::Left, "", Style::Success),
        Origin::System(Level::Warning) => (Side::Left, "", Style::Warning),
        Origin::System(Level::Error) => (Side::Left, "", Style::Error),
        Origin::Incoming => (Side::Left, INDICATOR, Style::Incoming),
        Origin::Outgoing => (Side::Right, INDICATOR, Style::Outgoing),
    }
}

/// Split content into the lines shown on screen.
///
/// A single trailing line break is dropped and control characters are shown
/// as spaces so peer input cannot move the cursor.
fn display_lines(content: &str) -> Vec<String> {
    let content = content.strip_suffix('\n').unwrap_or(content);
    content
        .split('\n')
        .map(|line| {
            line.strip_suffix('\r')
                .unwrap_or(line)
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect()
        })
        .collect()
}
