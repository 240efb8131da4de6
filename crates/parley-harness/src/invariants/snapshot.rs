//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of a session at a point in time:
//! what the screen shows, where both cursors are, the message log and the
//! connection state. Invariants operate on snapshots rather than live state
//! so a check never sees a half-applied event.

use parley_app::{App, ConnectionState, Cursor, ExitStatus, Message, Renderer};

use crate::{SimRuntime, VirtualScreen};

/// Snapshot of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// Screen width.
    pub columns: u16,
    /// Screen height.
    pub rows: u16,
    /// Visible rows, trailing spaces trimmed.
    pub lines: Vec<String>,
    /// Where the screen's cursor actually is.
    pub screen_cursor: Cursor,
    /// Where the renderer believes the cursor is.
    pub model_cursor: Cursor,
    /// Where the cursor belongs: the editor's column on the bottom row.
    pub input_position: Cursor,
    /// Message log, oldest first.
    pub log: Vec<Message>,
    /// Connection state.
    pub state: ConnectionState,
    /// Exit status, once decided.
    pub exit: Option<ExitStatus>,
}

impl SessionSnapshot {
    /// Capture a running simulated session.
    pub fn capture(runtime: &SimRuntime) -> Self {
        Self::from_renderer(runtime.renderer()).with_app(runtime.app())
    }

    /// Capture the screen side only. The session looks idle.
    pub fn from_renderer(renderer: &Renderer<VirtualScreen>) -> Self {
        let screen = renderer.screen();
        let (columns, rows) = parley_app::Screen::size(screen);
        Self {
            columns,
            rows,
            lines: screen.lines(),
            screen_cursor: screen.cursor(),
            model_cursor: renderer.cursor(),
            input_position: renderer.input_position(),
            log: renderer.log().iter().cloned().collect(),
            state: ConnectionState::Idle,
            exit: None,
        }
    }

    /// Take the connection state and exit status from `app`.
    #[must_use]
    pub fn with_app(mut self, app: &App) -> Self {
        self.state = app.connection_state().clone();
        self.exit = app.exit_status();
        self
    }

    /// Visible row `row`, or an empty string past the bottom.
    pub fn line(&self, row: u16) -> &str {
        self.lines.get(usize::from(row)).map_or("", String::as_str)
    }
}
